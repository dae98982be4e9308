use multisig_primitives::ProtocolParams;

/// Safety buffer added to the declared fee so the final, witnessed
/// transaction still clears the chain's size-linear minimum once the M
/// key-witnesses this script requires are attached after body finalization
/// (spec §4.4 step 4, design note "Fee buffer heuristic"): `min_fee_a ×
/// 300 × m_required`, 300 bytes being the conservative per-witness CBOR
/// size the spec pins. An exact size model would be tighter, but the spec
/// only requires that the declared fee never fall below the post-witness
/// minimum, not that the buffer be exact.
pub fn witness_fee_buffer(params: &ProtocolParams, m_required: u32) -> u64 {
    params.min_fee_a * 300 * m_required as u64
}

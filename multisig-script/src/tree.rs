use pallas::ledger::primitives::conway;
use pallas::ledger::primitives::Fragment;

use multisig_primitives::KeyHash;

use crate::error::ScriptError;

/// A native script tree (spec §3), independent of the wire encoding.
///
/// This is a plain tagged sum, not a `conway::NativeScript` newtype, so that
/// callers can build and inspect trees without pulling in CBOR concerns —
/// the same separation `hose` draws between its `primitives` types and the
/// `conway` wire types it only touches inside `build_conway`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeScript {
    Pubkey(KeyHash),
    All(Vec<NativeScript>),
    Any(Vec<NativeScript>),
    AtLeast(u32, Vec<NativeScript>),
    InvalidBefore(u64),
    InvalidHereafter(u64),
}

impl NativeScript {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ScriptError> {
        let parsed =
            conway::NativeScript::decode_fragment(bytes).map_err(|_| ScriptError::MalformedScript)?;
        Ok(Self::from_pallas(&parsed))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let pallas_script = self.to_pallas();
        pallas_script
            .encode_fragment()
            .expect("native script always encodes")
    }

    fn from_pallas(script: &conway::NativeScript) -> Self {
        match script {
            conway::NativeScript::ScriptPubkey(kh) => NativeScript::Pubkey(KeyHash::from(**kh)),
            conway::NativeScript::ScriptAll(children) => {
                NativeScript::All(children.iter().map(Self::from_pallas).collect())
            }
            conway::NativeScript::ScriptAny(children) => {
                NativeScript::Any(children.iter().map(Self::from_pallas).collect())
            }
            conway::NativeScript::ScriptNOfK(n, children) => {
                NativeScript::AtLeast(*n, children.iter().map(Self::from_pallas).collect())
            }
            conway::NativeScript::InvalidBefore(slot) => NativeScript::InvalidBefore(*slot),
            conway::NativeScript::InvalidHereafter(slot) => NativeScript::InvalidHereafter(*slot),
        }
    }

    fn to_pallas(&self) -> conway::NativeScript {
        match self {
            NativeScript::Pubkey(kh) => conway::NativeScript::ScriptPubkey((*kh).into()),
            NativeScript::All(children) => {
                conway::NativeScript::ScriptAll(children.iter().map(Self::to_pallas).collect())
            }
            NativeScript::Any(children) => {
                conway::NativeScript::ScriptAny(children.iter().map(Self::to_pallas).collect())
            }
            NativeScript::AtLeast(n, children) => {
                conway::NativeScript::ScriptNOfK(*n, children.iter().map(Self::to_pallas).collect())
            }
            NativeScript::InvalidBefore(slot) => conway::NativeScript::InvalidBefore(*slot),
            NativeScript::InvalidHereafter(slot) => conway::NativeScript::InvalidHereafter(*slot),
        }
    }

    /// The 28-byte script hash used to derive the controlling address:
    /// `blake2b_224(0x00 || cbor(script))`, the same tagged hash `hose`
    /// computes for every script kind (tag 0 = native) when it registers a
    /// script into a staging transaction.
    pub fn hash(&self) -> pallas::crypto::hash::Hash<28> {
        let bytes = self.to_bytes();
        pallas::crypto::hash::Hasher::<224>::hash_tagged(bytes.as_ref(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kh(byte: u8) -> KeyHash {
        KeyHash::from([byte; 28])
    }

    #[test]
    fn round_trips_through_cbor() {
        let script = NativeScript::AtLeast(
            2,
            vec![
                NativeScript::Pubkey(kh(1)),
                NativeScript::Pubkey(kh(2)),
                NativeScript::Pubkey(kh(3)),
            ],
        );
        let bytes = script.to_bytes();
        let parsed = NativeScript::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, script);
    }

    #[test]
    fn malformed_bytes_are_rejected() {
        assert!(NativeScript::from_bytes(&[0xff, 0xff]).is_err());
    }
}

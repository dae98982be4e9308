use std::collections::BTreeSet;

use pallas::crypto::hash::Hasher;
use pallas::crypto::key::ed25519::{PublicKey, Signature};
use pallas::ledger::primitives::conway::{Tx, WitnessSet};
use pallas::ledger::primitives::Fragment;

use multisig_primitives::KeyHash;

use crate::error::WitnessError;
use crate::session::{Session, SessionState, Witness};

/// Result of submitting a witness blob (spec §6 `submit_witness`): which
/// required signers' witnesses were stored, and which key-witnesses in the
/// blob were present but not part of this script's required signer set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitnessIntakeResult {
    pub accepted: Vec<KeyHash>,
    pub ignored: Vec<KeyHash>,
}

/// Derive the key hash a vkey witness attests to: `blake2b_224(vkey)`, the
/// same untagged hash `hose::wallet::key::PrivateKey::hash` computes for a
/// payment key (no tag byte — that's only for scripts).
fn key_hash_of(vkey: &[u8; 32]) -> KeyHash {
    let mut hasher = Hasher::<224>::new();
    hasher.input(vkey);
    hasher.finalize()
}

/// Decode a submitted witness blob into raw `(vkey, signature)` pairs.
///
/// Spec §4.6 accepts two wire shapes: a serialized witness-set on its own,
/// or a serialized full transaction from which the witness-set is pulled
/// out. Full-transaction is tried first since `conway::Tx` and
/// `conway::WitnessSet` don't otherwise overlap in their CBOR shape.
fn decode_witness_pairs(bytes: &[u8]) -> Result<Vec<([u8; 32], [u8; 64])>, WitnessError> {
    let witness_set = if let Ok(tx) = Tx::decode_fragment(bytes) {
        tx.transaction_witness_set
    } else {
        WitnessSet::decode_fragment(bytes).map_err(|_| WitnessError::InvalidWitnessCbor)?
    };

    let Some(vkeywitnesses) = witness_set.vkeywitness else {
        return Ok(Vec::new());
    };

    vkeywitnesses
        .iter()
        .map(|w| {
            let vkey: [u8; 32] = w
                .vkey
                .as_ref()
                .try_into()
                .map_err(|_| WitnessError::MalformedKey)?;
            let signature: [u8; 64] = w
                .signature
                .as_ref()
                .try_into()
                .map_err(|_| WitnessError::MalformedSignature)?;
            Ok((vkey, signature))
        })
        .collect()
}

/// Accept one already-decoded vkey witness into a session (the core of
/// component C6).
///
/// Checked in order: the key hash must be one the script actually requires,
/// and the signature must verify against the session's transaction body
/// hash. Storage is idempotent — re-submitting the same key/signature pair
/// is a no-op rather than an error, so a client can safely retry.
pub fn submit_witness(
    session: &mut Session,
    vkey: [u8; 32],
    signature: [u8; 64],
) -> Result<(), WitnessError> {
    let key_hash = key_hash_of(&vkey);

    if !session.required_key_hashes.contains(&key_hash) {
        return Err(WitnessError::KeyNotInScript);
    }

    if let Some(existing) = session.witnesses.get(&key_hash) {
        if existing.signature == signature {
            return Ok(());
        }
    }

    let public_key = PublicKey::from(vkey);
    let sig = Signature::from(signature);
    if !public_key.verify(session.session_id.as_ref(), &sig) {
        return Err(WitnessError::InvalidSignature);
    }

    session.witnesses.insert(
        key_hash,
        Witness {
            key_hash,
            vkey,
            signature,
        },
    );

    if session.is_ready() && session.state == SessionState::Collecting {
        session.state = SessionState::Ready;
    }

    Ok(())
}

/// Parse a submitted witness blob, extract every key-witness it carries,
/// enforce the allow-list, and insert every accepted one into the session
/// (spec §4.6, component C6, full entry point).
///
/// A key-witness whose hash isn't in `required_key_hashes` is ignored, not
/// an error — only a blob with *zero* allow-listed witnesses fails, with
/// `SignerNotAllowed` carrying the ignored set for diagnosis. A witness
/// whose key is allow-listed but whose signature is invalid is a hard
/// error: an allow-listed signer who submits garbage is a caller mistake
/// worth surfacing directly, not a silent drop.
pub fn submit_witness_blob(
    session: &mut Session,
    witness_bytes: &[u8],
) -> Result<WitnessIntakeResult, WitnessError> {
    let pairs = decode_witness_pairs(witness_bytes)?;

    let mut accepted = Vec::new();
    let mut ignored = BTreeSet::new();

    for (vkey, signature) in pairs {
        let key_hash = key_hash_of(&vkey);
        if !session.required_key_hashes.contains(&key_hash) {
            ignored.insert(key_hash);
            continue;
        }
        submit_witness(session, vkey, signature)?;
        accepted.push(key_hash);
    }

    if accepted.is_empty() {
        tracing::warn!(session_id = %session.session_id, ignored = ignored.len(), "witness blob had no allow-listed signers");
        return Err(WitnessError::SignerNotAllowed { ignored });
    }

    tracing::debug!(
        session_id = %session.session_id,
        accepted = accepted.len(),
        ignored = ignored.len(),
        collected = session.witness_count(),
        required = session.m_required,
        "witness blob ingested"
    );

    Ok(WitnessIntakeResult {
        accepted,
        ignored: ignored.into_iter().collect(),
    })
}

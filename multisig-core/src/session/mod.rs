mod assembler;
mod store;
mod witness;

pub use assembler::{assemble_signed_tx, submit, SubmitError};
pub use store::SessionStore;
pub use witness::{submit_witness, submit_witness_blob, WitnessIntakeResult};

use std::collections::{BTreeMap, BTreeSet};

use multisig_primitives::{KeyHash, TxHash, Value};

use crate::builder::PreviewOutput;

/// Where a session sits in its lifecycle (spec §3 "State Machine"):
/// collecting witnesses, holding enough to satisfy the script, or already
/// handed to the chain gateway. There is no "failed" state — a rejected
/// submission just leaves the session `Ready` so the caller can retry or
/// reset it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Collecting,
    Ready,
    Submitted { tx_hash: TxHash },
}

/// A single detached vkey witness collected for a session (spec §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Witness {
    pub key_hash: KeyHash,
    pub vkey: [u8; 32],
    pub signature: [u8; 64],
}

/// One in-flight coordination session, keyed by its own transaction body
/// hash (spec's "session id is the tx body hash" design note). Everything
/// needed to answer every client-facing operation in spec §6 lives on this
/// struct; the store (`SessionStore`) only ever hands out references to it
/// under a lock.
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: TxHash,
    pub body_bytes: Vec<u8>,
    pub full_tx_bytes: Vec<u8>,
    pub fee: u64,
    pub inputs_summary: Vec<(TxHash, u32, Value)>,
    pub outputs_summary: Vec<(String, Value)>,
    pub m_required: u32,
    pub required_key_hashes: BTreeSet<KeyHash>,
    pub witnesses: BTreeMap<KeyHash, Witness>,
    pub state: SessionState,
}

impl Session {
    pub fn new(
        artifact: crate::builder::BuildArtifact,
        m_required: u32,
        required_key_hashes: BTreeSet<KeyHash>,
    ) -> Self {
        let inputs_summary = artifact
            .inputs
            .iter()
            .map(|u| (u.tx_hash, u.output_index, u.value.clone()))
            .collect();
        let outputs_summary = artifact
            .outputs
            .iter()
            .map(|PreviewOutput { address, value }| (address.clone(), value.clone()))
            .collect();

        Self {
            session_id: artifact.session_id,
            body_bytes: artifact.body_bytes,
            full_tx_bytes: artifact.full_tx_bytes,
            fee: artifact.fee,
            inputs_summary,
            outputs_summary,
            m_required,
            required_key_hashes,
            witnesses: BTreeMap::new(),
            state: SessionState::Collecting,
        }
    }

    pub fn witness_count(&self) -> u32 {
        self.witnesses.len() as u32
    }

    pub fn is_ready(&self) -> bool {
        self.witness_count() >= self.m_required
    }

    /// Drop back to `Collecting` with an empty witness set, per spec's
    /// explicit reset operation — resetting a session never creates a new
    /// one, it clears this one in place.
    pub fn reset(&mut self) {
        tracing::info!(session_id = %self.session_id, "session reset");
        self.witnesses.clear();
        self.state = SessionState::Collecting;
    }
}

//! The client-facing operation table from spec §6, as plain async
//! functions over a shared `Coordinator` handle — grounded the same way
//! `hose-txbuilder::main` calls straight into `hose::builder`/`submission`
//! functions rather than standing up a server framework; this crate's
//! "server" is just these functions plus whatever embeds them.

use std::collections::BTreeSet;

use multisig_core::{build, BuildOptions, Mode, RequestedOutput, Session, SessionState, SessionStore};
use multisig_gateway::{BlockfrostGateway, ChainGateway};
use multisig_primitives::{KeyHash, TxHash, Value};
use multisig_script::{NativeScript, ScriptSummary};

use crate::error::CoordinatorError;

/// Everything a running coordinator holds: the script it serves (and its
/// derived summary), the address that script controls, which gateway to
/// reach the chain through, and the in-memory session table.
pub struct Coordinator {
    pub gateway: BlockfrostGateway,
    pub payment_script: NativeScript,
    pub summary: ScriptSummary,
    pub multisig_address: String,
    pub network_id: u8,
    pub min_ada_lovelace: u64,
    pub store: SessionStore,
}

impl Coordinator {
    pub fn new(
        gateway: BlockfrostGateway,
        payment_script: NativeScript,
        multisig_address: String,
        network_id: u8,
        min_ada_lovelace: u64,
    ) -> Self {
        let summary = ScriptSummary::summarize(&payment_script);
        Self {
            gateway,
            payment_script,
            summary,
            multisig_address,
            network_id,
            min_ada_lovelace,
            store: SessionStore::new(),
        }
    }

    /// Build an unsigned transaction against the script's current UTxOs and
    /// open a fresh session for it (spec §6 `create_session`). Sweeps
    /// everything to `destination_address` when given one; otherwise
    /// spends exactly enough to cover `outputs`, returning change to the
    /// multisig address itself.
    pub async fn create_session(
        &self,
        destination_address: Option<String>,
        outputs: Vec<(String, Value)>,
    ) -> Result<TxHash, CoordinatorError> {
        let available = self.gateway.utxos_at(&self.multisig_address).await?;
        let params = self.gateway.protocol_parameters().await?;

        let mode = match destination_address {
            Some(destination_address) => Mode::SweepAll { destination_address },
            None => Mode::Explicit {
                outputs: outputs
                    .into_iter()
                    .map(|(address, value)| RequestedOutput { address, value })
                    .collect(),
            },
        };

        let options = BuildOptions {
            multisig_address: self.multisig_address.clone(),
            payment_script: self.payment_script.clone(),
            required_key_hashes: self.summary.required_key_hashes.clone(),
            m_required: self.summary.m_required,
            min_ada_lovelace: self.min_ada_lovelace,
            network_id: self.network_id,
            mode,
        };

        let artifact = build(options, &available, &params)?;
        let session_id = artifact.session_id;
        let session = Session::new(artifact, self.summary.m_required, self.summary.required_key_hashes.clone());
        self.store.insert(session).await;
        Ok(session_id)
    }

    /// The unsigned transaction body bytes a client signs over (spec §6
    /// `get_body`).
    pub async fn get_body(&self, session_id: &TxHash) -> Result<Vec<u8>, CoordinatorError> {
        let session = self.store.get(session_id).await?;
        Ok(session.body_bytes)
    }

    /// Every witness collected so far, each re-encoded as its own one-entry
    /// witness-set, alongside the script's `m`-of-`n` shape (spec §6
    /// `list_witnesses` -> `[(signer_kh, witness_hex)], m, required` where
    /// `m` is the threshold and `required` the full designated signer set).
    pub async fn list_witnesses(&self, session_id: &TxHash) -> Result<(Vec<(KeyHash, Vec<u8>)>, u32, u32), CoordinatorError> {
        let session = self.store.get(session_id).await?;
        let witnesses = session
            .witnesses
            .values()
            .map(|w| (w.key_hash, multisig_core::encode_single_key_witness_set(w.vkey, w.signature)))
            .collect();
        Ok((witnesses, session.m_required, session.required_key_hashes.len() as u32))
    }

    /// Accept a submitted witness blob — either a bare witness-set or a
    /// full transaction — against the allow-list (spec §6 `submit_witness`,
    /// component C6). Returns which key hashes were newly accepted, which
    /// were present in the blob but outside the required signer set, and
    /// the collected/required counts after intake.
    pub async fn submit_witness(
        &self,
        session_id: &TxHash,
        witness_bytes: &[u8],
    ) -> Result<(multisig_core::WitnessIntakeResult, u32, u32), CoordinatorError> {
        let (result, collected, required) = self
            .store
            .with_mut(session_id, |session| {
                let result = multisig_core::session::submit_witness_blob(session, witness_bytes)?;
                Ok::<_, multisig_core::WitnessError>((result, session.witness_count(), session.m_required))
            })
            .await??;
        Ok((result, collected, required))
    }

    /// Threshold, designated signer count, collected signer set and
    /// current state (spec §6 `status` -> `m, required, collected[],
    /// preview`). The preview (outputs, fee, inputs) lives on the session
    /// itself via `inputs_summary`/`outputs_summary`/`fee`.
    pub async fn status(&self, session_id: &TxHash) -> Result<(u32, u32, BTreeSet<KeyHash>, SessionState), CoordinatorError> {
        let session = self.store.get(session_id).await?;
        Ok((
            session.m_required,
            session.required_key_hashes.len() as u32,
            session.witnesses.keys().copied().collect(),
            session.state.clone(),
        ))
    }

    /// Assemble and submit a ready session (spec §6 `submit`, component
    /// C7). Takes the session out from under the store's lock for the
    /// duration of the (network-bound) submit call — `SessionStore::with_mut`
    /// only runs synchronous closures, so it can't itself hold the lock
    /// across an `await`. On acceptance the session is destroyed (spec §3
    /// state machine: `Ready -> Submitted` is terminal and the session is
    /// removed); on rejection it's written back untouched so the caller can
    /// retry or reset it.
    pub async fn submit(&self, session_id: &TxHash) -> Result<TxHash, CoordinatorError> {
        let mut session = self.store.get(session_id).await?;
        match multisig_core::session::submit(&mut session, &self.gateway).await {
            Ok(tx_hash) => {
                self.store.remove(session_id).await;
                Ok(tx_hash)
            }
            Err(multisig_core::SubmitError::Threshold(e)) => Err(e.into()),
            Err(multisig_core::SubmitError::Chain(e)) => {
                self.store.insert(session).await;
                Err(e.into())
            }
        }
    }

    /// Clear all collected witnesses on one session, or on every live
    /// session when no id is given (spec §6 `reset(optional session_id)`),
    /// the same "tear down one shared piece of state at once" shape
    /// `hose-txbuilder`'s `Config`/`main.rs` applies to its own process
    /// state. Either way the unsigned transaction itself is untouched —
    /// only collected witnesses and session state reset.
    pub async fn reset(&self, session_id: Option<&TxHash>) -> Result<(), CoordinatorError> {
        match session_id {
            Some(session_id) => {
                self.store.with_mut(session_id, |session| session.reset()).await?;
            }
            None => {
                self.store.reset_all().await;
            }
        }
        Ok(())
    }
}

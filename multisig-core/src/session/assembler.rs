use multisig_gateway::ChainGateway;

use crate::builder;
use crate::error::SessionError;
use crate::session::{Session, SessionState};

/// Attach every collected witness to a session's unsigned transaction and
/// return the signed wire bytes, without submitting anything (component
/// C7, assembly half). Fails closed if the script's threshold isn't met
/// yet — callers should check `status` first, but this is the actual
/// guard.
pub fn assemble_signed_tx(session: &Session) -> Result<Vec<u8>, SessionError> {
    if !session.is_ready() {
        return Err(SessionError::ThresholdNotMet {
            have: session.witness_count(),
            need: session.m_required,
        });
    }

    let witnesses: Vec<_> = session
        .witnesses
        .values()
        .map(|w| (w.key_hash, w.vkey, w.signature))
        .collect();

    Ok(builder::attach_witnesses(&session.full_tx_bytes, &witnesses))
}

/// Failures raised while assembling and submitting a ready session
/// (component C7). Kept generic over the gateway's own error type so this
/// crate never needs to know which `ChainGateway` impl a caller picked.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError<E: std::error::Error> {
    #[error(transparent)]
    Threshold(#[from] SessionError),
    #[error("chain gateway rejected the submission: {0}")]
    Chain(E),
}

/// Assemble and submit a ready session through a chain gateway (component
/// C7, submission half). On success the session transitions to
/// `Submitted`; on rejection it's left exactly as it was so the caller can
/// inspect, reset, or retry.
pub async fn submit<G: ChainGateway>(
    session: &mut Session,
    gateway: &G,
) -> Result<multisig_primitives::TxHash, SubmitError<G::Error>> {
    if let SessionState::Submitted { tx_hash } = session.state {
        return Ok(tx_hash);
    }

    let signed = assemble_signed_tx(session)?;
    let tx_hash = match gateway.submit(&signed).await {
        Ok(tx_hash) => tx_hash,
        Err(err) => {
            tracing::warn!(session_id = %session.session_id, error = %err, "submission rejected");
            return Err(SubmitError::Chain(err));
        }
    };

    tracing::info!(session_id = %session.session_id, tx_hash = %tx_hash, "transaction submitted");
    session.state = SessionState::Submitted { tx_hash };
    Ok(tx_hash)
}

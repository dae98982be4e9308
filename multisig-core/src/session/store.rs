use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use multisig_primitives::TxHash;

use crate::error::SessionError;
use crate::session::Session;

/// The process-wide session table (component C5), guarded by a single
/// mutex the same way `hose`'s builder wraps its whole `UtxoIndexer` in one
/// `Arc<Mutex<_>>` rather than locking per-entry — sessions are created and
/// mutated rarely enough relative to request latency that per-session
/// locking isn't worth the complexity (spec §5's concurrency model).
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<TxHash, Session>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Insert a freshly built session, replacing anything already stored
    /// under the same id. Building the same transaction twice is harmless:
    /// the session id is derived from the transaction body, so a repeat
    /// build just re-stores an equivalent session.
    pub async fn insert(&self, session: Session) {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(session.session_id, session);
    }

    pub async fn get(&self, session_id: &TxHash) -> Result<Session, SessionError> {
        let sessions = self.sessions.lock().await;
        sessions.get(session_id).cloned().ok_or(SessionError::NotFound)
    }

    /// Apply `f` to the stored session under its own lock and return
    /// whatever it produces, or `SessionError::NotFound` if the id is gone.
    pub async fn with_mut<F, R>(&self, session_id: &TxHash, f: F) -> Result<R, SessionError>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(session_id).ok_or(SessionError::NotFound)?;
        Ok(f(session))
    }

    /// Drop a single session, e.g. once it has been submitted successfully
    /// (spec §3/§4.7: a submitted session is destroyed, not kept around in
    /// its terminal state).
    pub async fn remove(&self, session_id: &TxHash) {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(session_id);
    }

    /// Drop every session, the same "reset everything" escape hatch a
    /// single-operator coordination service needs when it's been torn down
    /// and restarted against a fresh chain state.
    pub async fn reset_all(&self) {
        let mut sessions = self.sessions.lock().await;
        tracing::info!(cleared = sessions.len(), "all sessions reset");
        sessions.clear();
    }

    pub async fn list_ids(&self) -> Vec<TxHash> {
        let sessions = self.sessions.lock().await;
        sessions.keys().copied().collect()
    }
}

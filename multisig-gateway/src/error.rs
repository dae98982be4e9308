#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// A gateway call (spec §5 "Chain-gateway calls have a caller-supplied
    /// deadline, default 30s") ran past its deadline before the indexer
    /// replied.
    #[error("indexer request timed out")]
    Timeout,

    #[error("indexer request failed: {0}")]
    Transport(reqwest::Error),

    #[error("indexer returned malformed data: {0}")]
    MalformedResponse(String),

    #[error("indexer rejected the submission: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for ChainError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChainError::Timeout
        } else {
            ChainError::Transport(err)
        }
    }
}

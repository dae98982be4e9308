#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("script bytes could not be decoded as a native script")]
    MalformedScript,
    #[error("network id must be 0 or 1")]
    InvalidNetworkId,
}

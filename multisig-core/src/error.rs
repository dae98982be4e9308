/// Failures raised while assembling a transaction body (component C4).
///
/// Named the same way `hose::builder::tx::TxBuilderError` is: one flat enum
/// covering both caller mistakes (bad address, bad mode) and funds shortfalls.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("multisig address is not valid bech32")]
    InvalidAddress,

    #[error("payment script could not be decoded")]
    InvalidScript,

    #[error("explicit outputs must be non-empty")]
    NoOutputsRequested,

    #[error("insufficient ada: have {have}, need {need}")]
    InsufficientAda { have: u64, need: u64 },

    #[error("insufficient native assets to cover requested outputs")]
    InsufficientTokens,

    #[error("change output would fall below the minimum ada requirement")]
    ChangeBelowMinAda,

    #[error("fee calculation did not converge after the second pass")]
    FeeDidNotConverge,
}

/// Failures raised while accepting a witness into a session (component C6).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WitnessError {
    #[error("witness key hash is not part of this script's required signer set")]
    KeyNotInScript,

    #[error("witness signature does not verify against the session's transaction body hash")]
    InvalidSignature,

    #[error("witness vkey is not 32 bytes")]
    MalformedKey,

    #[error("witness signature is not 64 bytes")]
    MalformedSignature,

    #[error("witness blob could not be decoded as a witness set or a full transaction")]
    InvalidWitnessCbor,

    #[error("no submitted key-witness belongs to this script's required signer set: ignored {ignored:?}")]
    SignerNotAllowed {
        ignored: std::collections::BTreeSet<multisig_primitives::KeyHash>,
    },
}

/// Failures raised by session lookups and the assembler (components C5/C7).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("no session with this id")]
    NotFound,

    #[error("session does not yet have enough witnesses to satisfy the script (have {have}, need {need})")]
    ThresholdNotMet { have: u32, need: u32 },
}

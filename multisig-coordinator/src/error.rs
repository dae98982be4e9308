use thiserror::Error;

use multisig_core::{BuildError, SessionError, WitnessError};
use multisig_gateway::ChainError;
use multisig_script::ScriptError;

/// Everything a client-facing operation (spec §6) can fail with, folded
/// into one enum the same way `hose-txbuilder`'s `main` flattens its
/// builder/signing/submission errors into `anyhow::Error` before printing
/// them — except kept as a typed enum here since the coordinator's
/// operations are library functions, not a CLI's final exit path.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("script: {0}")]
    Script(#[from] ScriptError),
    #[error("build: {0}")]
    Build(#[from] BuildError),
    #[error("session: {0}")]
    Session(#[from] SessionError),
    #[error("witness: {0}")]
    Witness(#[from] WitnessError),
    #[error("chain: {0}")]
    Chain(#[from] ChainError),
}

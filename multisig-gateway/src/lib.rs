mod blockfrost;
mod error;
mod wire;

pub use blockfrost::BlockfrostGateway;
pub use error::ChainError;

use multisig_primitives::{ProtocolParams, TxHash, Utxo};

/// The chain-facing boundary (spec component C1). Everything upstream of a
/// session only ever sees UTxOs, protocol parameters and a submission
/// result through this trait — never a raw indexer response type.
///
/// Mirrors the shape of `hose_submission::SubmitTx` (an async trait with a
/// single associated `Error`), widened to cover the read side a coordinator
/// also needs (querying UTxOs and protocol parameters), since this system
/// has no local node to query directly the way `hose`'s `NodeClient` does.
#[allow(async_fn_in_trait)]
pub trait ChainGateway {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn utxos_at(&self, address: &str) -> Result<Vec<Utxo>, Self::Error>;

    async fn protocol_parameters(&self) -> Result<ProtocolParams, Self::Error>;

    async fn submit(&self, signed_tx_bytes: &[u8]) -> Result<TxHash, Self::Error>;
}

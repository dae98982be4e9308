use std::time::Duration;

use multisig_primitives::{ProtocolParams, TxHash, Utxo, Value};

use crate::error::ChainError;
use crate::wire::{ProtocolParamsResponse, SubmitErrorResponse, UtxoEntry};
use crate::ChainGateway;

/// Default caller-supplied deadline for every gateway call (spec §5:
/// "Chain-gateway calls have a caller-supplied deadline (default 30 s)
/// after which they fail with `ChainError::Timeout`").
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A `ChainGateway` backed by a Blockfrost-shaped REST indexer (spec §6).
///
/// Grounded on the client/error split `hose_submission::ogmios::OgmiosClient`
/// uses, adapted from a persistent JSON-RPC websocket connection to a plain
/// `reqwest::Client` making one request per call, since the indexer contract
/// here is a stateless REST API rather than a node-attached RPC session.
pub struct BlockfrostGateway {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
}

impl BlockfrostGateway {
    /// Build a gateway with the default 30s per-call deadline.
    pub fn new(base_url: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self::with_timeout(base_url, project_id, DEFAULT_TIMEOUT)
    }

    /// Build a gateway whose every call (UTxO fetch, parameter fetch,
    /// submit) is bounded by `timeout`; a call that doesn't complete in time
    /// fails with `ChainError::Timeout`, never hangs the caller.
    pub fn with_timeout(base_url: impl Into<String>, project_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("reqwest client builds with a plain timeout"),
            base_url: base_url.into(),
            project_id: project_id.into(),
        }
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .header("project_id", &self.project_id)
    }
}

impl ChainGateway for BlockfrostGateway {
    type Error = ChainError;

    async fn utxos_at(&self, address: &str) -> Result<Vec<Utxo>, Self::Error> {
        tracing::debug!(%address, "fetching utxos");
        let entries: Vec<UtxoEntry> = self
            .request(&format!("/addresses/{address}/utxos"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        entries
            .into_iter()
            .map(|entry| {
                let tx_hash = decode_tx_hash(&entry.tx_hash)?;
                let amounts: Vec<(String, u64)> = entry
                    .amount
                    .into_iter()
                    .map(|a| (a.unit, a.quantity))
                    .collect();
                let value = Value::from_wire(&amounts)
                    .map_err(|e| ChainError::MalformedResponse(e.to_string()))?;
                Ok(Utxo::new(tx_hash, entry.output_index, value))
            })
            .collect()
    }

    async fn protocol_parameters(&self) -> Result<ProtocolParams, Self::Error> {
        let response: ProtocolParamsResponse = self
            .request("/epochs/latest/parameters")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let max_val_size = response
            .max_val_size
            .parse()
            .map_err(|_| ChainError::MalformedResponse("max_val_size not numeric".into()))?;

        Ok(ProtocolParams {
            min_fee_a: response.min_fee_a,
            min_fee_b: response.min_fee_b,
            pool_deposit: response.pool_deposit,
            key_deposit: response.key_deposit,
            max_val_size,
            max_tx_size: response.max_tx_size,
            coins_per_utxo_size: response.coins_per_utxo_size,
        })
    }

    async fn submit(&self, signed_tx_bytes: &[u8]) -> Result<TxHash, Self::Error> {
        tracing::debug!(bytes = signed_tx_bytes.len(), "submitting transaction");
        let response = self
            .http
            .post(format!("{}/tx/submit", self.base_url))
            .header("project_id", &self.project_id)
            .header("Content-Type", "application/cbor")
            .body(signed_tx_bytes.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            let body: SubmitErrorResponse = response.json().await.unwrap_or(SubmitErrorResponse {
                message: "submission rejected with no body".into(),
            });
            return Err(ChainError::Rejected(body.message));
        }

        let raw: String = response.json().await?;
        decode_tx_hash(raw.trim_matches('"'))
    }
}

fn decode_tx_hash(hex_str: &str) -> Result<TxHash, ChainError> {
    let bytes = hex::decode(hex_str)
        .map_err(|_| ChainError::MalformedResponse(format!("not hex: {hex_str}")))?;
    let array: [u8; 32] = bytes
        .try_into()
        .map_err(|_| ChainError::MalformedResponse("tx hash must be 32 bytes".into()))?;
    Ok(TxHash::from(array))
}

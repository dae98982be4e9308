use serde::{Deserialize, Deserializer};

/// DTOs for the Blockfrost-shaped indexer contract (spec §6). Blockfrost
/// returns several numeric protocol-parameter fields as JSON strings, so
/// every numeric field here is parsed through [`number_as_string`].
#[derive(Debug, Deserialize)]
pub struct UtxoEntry {
    pub tx_hash: String,
    pub output_index: u32,
    pub amount: Vec<AmountEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AmountEntry {
    pub unit: String,
    #[serde(deserialize_with = "number_as_string")]
    pub quantity: u64,
}

#[derive(Debug, Deserialize)]
pub struct ProtocolParamsResponse {
    #[serde(deserialize_with = "number_as_string")]
    pub min_fee_a: u64,
    #[serde(deserialize_with = "number_as_string")]
    pub min_fee_b: u64,
    #[serde(deserialize_with = "number_as_string")]
    pub pool_deposit: u64,
    #[serde(deserialize_with = "number_as_string")]
    pub key_deposit: u64,
    pub max_val_size: String,
    pub max_tx_size: u64,
    #[serde(deserialize_with = "number_as_string")]
    pub coins_per_utxo_size: u64,
}

fn number_as_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrU64 {
        String(String),
        U64(u64),
    }
    match StringOrU64::deserialize(deserializer)? {
        StringOrU64::String(s) => s.parse().map_err(serde::de::Error::custom),
        StringOrU64::U64(n) => Ok(n),
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitErrorResponse {
    #[serde(default)]
    pub message: String,
}

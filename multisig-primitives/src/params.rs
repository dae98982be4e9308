use serde::Deserialize;

/// Protocol parameters as returned by `GET /epochs/latest/parameters`
/// (spec §6). Field names match the indexer's JSON verbatim; `serde(alias)`
/// carries the legacy `coins_per_utxo_byte` name the same way `hose`'s own
/// parameter bootstrapping carries multiple genesis-era field spellings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProtocolParams {
    pub min_fee_a: u64,
    pub min_fee_b: u64,
    pub pool_deposit: u64,
    pub key_deposit: u64,
    pub max_val_size: u64,
    pub max_tx_size: u64,
    #[serde(alias = "coins_per_utxo_byte")]
    pub coins_per_utxo_size: u64,
}

impl ProtocolParams {
    /// `min_fee(size) = min_fee_b + min_fee_a * size`, the linear fee model
    /// used throughout `hose`'s fee calculation (e.g.
    /// `hose-txbuilder::simple_tx::calculate_fee`).
    pub fn min_fee(&self, tx_size_bytes: u64) -> u64 {
        self.min_fee_b + self.min_fee_a * tx_size_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ProtocolParams {
        ProtocolParams {
            min_fee_a: 44,
            min_fee_b: 155_381,
            pool_deposit: 500_000_000,
            key_deposit: 2_000_000,
            max_val_size: 5000,
            max_tx_size: 16384,
            coins_per_utxo_size: 4310,
        }
    }

    #[test]
    fn min_fee_is_linear_in_size() {
        let p = params();
        assert_eq!(p.min_fee(0), 155_381);
        assert_eq!(p.min_fee(300), 155_381 + 44 * 300);
    }

    #[test]
    fn legacy_field_name_deserializes() {
        let json = serde_json::json!({
            "min_fee_a": 44,
            "min_fee_b": 155381,
            "pool_deposit": 500000000,
            "key_deposit": 2000000,
            "max_val_size": 5000,
            "max_tx_size": 16384,
            "coins_per_utxo_byte": 4310,
        });
        let p: ProtocolParams = serde_json::from_value(json).unwrap();
        assert_eq!(p.coins_per_utxo_size, 4310);
    }
}

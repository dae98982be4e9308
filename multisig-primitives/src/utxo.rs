use crate::{TxHash, Value};

/// An unspent output at the controlled script address (spec §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    pub tx_hash: TxHash,
    pub output_index: u32,
    pub value: Value,
}

impl Utxo {
    pub fn new(tx_hash: TxHash, output_index: u32, value: Value) -> Self {
        Self {
            tx_hash,
            output_index,
            value,
        }
    }
}

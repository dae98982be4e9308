//! Shared data types for the multisig transaction coordinator.
//!
//! Plays the role `hose-primitives` plays for `hose`: small, dependency-light
//! types shared by the script analyzer, the transaction builder and the
//! chain gateway, with no knowledge of any of those components.

mod network;
mod params;
mod utxo;
mod value;

pub use network::Network;
pub use params::ProtocolParams;
pub use utxo::Utxo;
pub use value::{AssetName, InvalidUnit, PolicyId, Underflow, Value};

/// A 28-byte key hash, canonically displayed as lowercase hex.
pub type KeyHash = pallas::crypto::hash::Hash<28>;

/// A 32-byte transaction (body) hash.
pub type TxHash = pallas::crypto::hash::Hash<32>;

/// Parse a lowercase-hex key hash, rejecting anything that isn't exactly 28 bytes.
pub fn parse_key_hash(hex_str: &str) -> Result<KeyHash, InvalidUnit> {
    let bytes = hex::decode(hex_str).map_err(|_| InvalidUnit::NotHex)?;
    let array: [u8; 28] = bytes
        .try_into()
        .map_err(|_| InvalidUnit::WrongLength { expected: 28 })?;
    Ok(KeyHash::from(array))
}

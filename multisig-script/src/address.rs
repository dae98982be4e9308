use pallas::ledger::addresses::{Address, ShelleyAddress, ShelleyDelegationPart, ShelleyPaymentPart};

use multisig_primitives::Network;

use crate::error::ScriptError;

/// Enterprise address (payment credential only) for a script hash, per
/// spec §4.3. Mirrors the `ShelleyAddress::new(.., ShelleyPaymentPart::Script(..),
/// ShelleyDelegationPart::Null)` construction `hose`'s devnet tests use to
/// derive a script's spending address.
pub fn derive_enterprise_address(
    payment_script_hash: pallas::crypto::hash::Hash<28>,
    network: Network,
) -> Result<String, ScriptError> {
    let address = Address::Shelley(ShelleyAddress::new(
        network.pallas_network(),
        ShelleyPaymentPart::Script(payment_script_hash),
        ShelleyDelegationPart::Null,
    ));
    address.to_bech32().map_err(|_| ScriptError::InvalidNetworkId)
}

/// Base address (payment + stake credential) when a stake script is also
/// configured.
pub fn derive_base_address(
    payment_script_hash: pallas::crypto::hash::Hash<28>,
    stake_script_hash: pallas::crypto::hash::Hash<28>,
    network: Network,
) -> Result<String, ScriptError> {
    let address = Address::Shelley(ShelleyAddress::new(
        network.pallas_network(),
        ShelleyPaymentPart::Script(payment_script_hash),
        ShelleyDelegationPart::Script(stake_script_hash),
    ));
    address.to_bech32().map_err(|_| ScriptError::InvalidNetworkId)
}

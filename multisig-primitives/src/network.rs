use std::str::FromStr;

/// Which chain network the coordinator is configured against.
///
/// Mirrors `hose-primitives::NetworkId`, renamed to the two values this
/// service actually supports (spec §6 configuration key `network`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Preprod,
}

impl Network {
    /// The single-byte network id used in addresses and required-signer
    /// derivation (conway CDDL: 0 = testnet family, 1 = mainnet).
    pub fn id(self) -> u8 {
        match self {
            Network::Mainnet => 1,
            Network::Preprod => 0,
        }
    }

    pub fn pallas_network(self) -> pallas::ledger::addresses::Network {
        match self {
            Network::Mainnet => pallas::ledger::addresses::Network::Mainnet,
            Network::Preprod => pallas::ledger::addresses::Network::Testnet,
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(Network::Mainnet),
            "preprod" => Ok(Network::Preprod),
            other => Err(format!("unknown network {other}")),
        }
    }
}

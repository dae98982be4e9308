use clap::Parser;

use multisig_primitives::Network;

/// Everything the coordinator needs to start: which script it serves,
/// which network and indexer it talks to. Mirrors the flat
/// `#[derive(Parser)]` + `#[arg(long, env)]` shape `hose-devnet`'s and
/// `example`'s `Config` use, rather than their two-struct
/// `ConfigInput` -> `Config` split — that split exists there to turn a
/// mnemonic into a derived wallet key, and nothing here needs a
/// post-processing pass.
#[derive(Parser, Debug, Clone)]
pub struct Config {
    /// Hex-encoded CBOR of the native script this coordinator serves.
    #[arg(long, env)]
    pub payment_script_hex: String,

    /// `mainnet` or `preprod` (spec §6 configuration key `network`).
    #[arg(long, env, value_parser = parse_network)]
    pub network: Network,

    /// Base URL of the Blockfrost-shaped chain indexer.
    #[arg(long, env)]
    pub indexer_base_url: String,

    /// Project id / API key sent as the indexer's auth header.
    #[arg(long, env)]
    pub indexer_project_id: String,

    /// Floor (in lovelace) a token-carrying output's coin must clear
    /// (spec §6 configuration key `min_ada_lovelace`).
    #[arg(long, env, default_value_t = 2_000_000)]
    pub min_ada_lovelace: u64,

    /// Per-call deadline for chain gateway requests, in seconds (spec §5:
    /// "caller-supplied deadline (default 30 s)").
    #[arg(long, env, default_value_t = 30)]
    pub gateway_timeout_secs: u64,
}

fn parse_network(s: &str) -> Result<Network, String> {
    s.to_lowercase().parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_from_long_flags() {
        let config = Config::parse_from([
            "multisig-coordinator",
            "--payment-script-hex",
            "8200581c00000000000000000000000000000000000000000000000000000000",
            "--network",
            "preprod",
            "--indexer-base-url",
            "https://cardano-preprod.blockfrost.io/api/v0",
            "--indexer-project-id",
            "preprodXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX",
        ]);
        assert_eq!(config.network, Network::Preprod);
    }

    #[test]
    fn rejects_an_unknown_network() {
        assert!(parse_network("regtest").is_err());
    }
}

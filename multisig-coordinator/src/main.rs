use anyhow::Context;
use clap::Parser;

use multisig_gateway::BlockfrostGateway;
use multisig_script::{derive_enterprise_address, NativeScript};

mod config;
mod error;
mod service;

use config::Config;
use service::Coordinator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Same "ignore a missing .env" shrug `hose-txbuilder::main` uses — fine
    // in development, absent entirely once this runs as a deployed service.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::parse();

    let script_bytes = hex::decode(&config.payment_script_hex).context("payment script is not valid hex")?;
    let payment_script = NativeScript::from_bytes(&script_bytes).context("payment script is not a valid native script")?;
    let multisig_address = derive_enterprise_address(payment_script.hash(), config.network)
        .context("could not derive the multisig address from the payment script")?;

    tracing::info!(address = %multisig_address, "serving native script");

    let gateway = BlockfrostGateway::with_timeout(
        config.indexer_base_url.clone(),
        config.indexer_project_id.clone(),
        std::time::Duration::from_secs(config.gateway_timeout_secs),
    );
    let coordinator = Coordinator::new(
        gateway,
        payment_script,
        multisig_address,
        config.network.id(),
        config.min_ada_lovelace,
    );

    tracing::info!(
        m_required = coordinator.summary.m_required,
        signers = coordinator.summary.required_key_hashes.len(),
        "coordinator ready"
    );

    // Spec §1 scopes out any server transport for this binary — it wires
    // the gateway, the script and the session store together and stops
    // there. Whatever embeds `Coordinator` drives `create_session`,
    // `submit_witness`, `submit` and the rest of spec §6's operation table
    // from here, the same way `hose-txbuilder::main` drives `simple_tx`
    // once its client and config are built.

    Ok(())
}

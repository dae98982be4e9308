mod fee;
mod tx;

pub use tx::{attach_witnesses, encode_single_key_witness_set};

use std::collections::BTreeSet;

use multisig_primitives::{KeyHash, ProtocolParams, TxHash, Utxo, Value};
use multisig_script::NativeScript;

use crate::error::BuildError;

/// What to do with the funds currently sitting at the multisig address
/// (spec §4.4).
pub enum Mode {
    /// Spend every controlled UTxO, sending the full (fee-adjusted) balance
    /// to a single destination.
    SweepAll { destination_address: String },
    /// Spend every controlled UTxO to cover a fixed list of outputs;
    /// any leftover funds return to the multisig address itself.
    Explicit { outputs: Vec<RequestedOutput> },
}

pub struct RequestedOutput {
    pub address: String,
    pub value: Value,
}

pub struct BuildOptions {
    pub multisig_address: String,
    pub payment_script: NativeScript,
    pub required_key_hashes: BTreeSet<KeyHash>,
    /// Taken from configuration, not re-derived from the script (spec
    /// §4.4: "C4 does NOT re-derive these") — drives both the fee buffer
    /// and the required-signers list attached to the body.
    pub m_required: u32,
    /// Floor a token-carrying output's coin must clear (spec §3
    /// "min-ada floor", configuration key `min_ada_lovelace`, default
    /// 2,000,000).
    pub min_ada_lovelace: u64,
    pub network_id: u8,
    pub mode: Mode,
}

/// A line in the human-facing preview of what a built transaction does,
/// independent of the CBOR it assembles to.
pub struct PreviewOutput {
    pub address: String,
    pub value: Value,
}

pub struct BuildArtifact {
    pub session_id: TxHash,
    pub body_bytes: Vec<u8>,
    pub full_tx_bytes: Vec<u8>,
    pub fee: u64,
    pub inputs: Vec<Utxo>,
    pub outputs: Vec<PreviewOutput>,
}

/// Build an unsigned transaction spending from `available` (spec C4).
///
/// Uses the two-pass buffered-fee strategy `hose_txbuilder::simple_tx`
/// uses: assemble once with a fee guess large enough to dominate the real
/// fee, compute the real linear fee from the resulting size, then rebuild
/// with that fee and confirm a third pass agrees — the same convergence
/// check `simple_transaction` performs before returning.
pub fn build(
    options: BuildOptions,
    available: &[Utxo],
    params: &ProtocolParams,
) -> Result<BuildArtifact, BuildError> {
    match options.mode {
        Mode::SweepAll { destination_address } => build_sweep_all(
            &options.payment_script,
            &options.required_key_hashes,
            options.m_required,
            options.min_ada_lovelace,
            options.network_id,
            &destination_address,
            available,
            params,
        ),
        Mode::Explicit { outputs } => build_explicit(
            &options.multisig_address,
            &options.payment_script,
            &options.required_key_hashes,
            options.m_required,
            options.min_ada_lovelace,
            options.network_id,
            outputs,
            available,
            params,
        ),
    }
}

/// Fee guess large enough that the real fee (linear in a few-hundred-byte
/// transaction) can never exceed it, so the first pass never underpays.
fn fee_guess(params: &ProtocolParams) -> u64 {
    params.min_fee(params.max_tx_size)
}

#[allow(clippy::too_many_arguments)]
fn build_sweep_all(
    payment_script: &NativeScript,
    required_key_hashes: &BTreeSet<KeyHash>,
    m_required: u32,
    min_ada_lovelace: u64,
    network_id: u8,
    destination_address: &str,
    available: &[Utxo],
    params: &ProtocolParams,
) -> Result<BuildArtifact, BuildError> {
    if available.is_empty() {
        return Err(BuildError::InsufficientAda { have: 0, need: min_ada_lovelace });
    }

    let total = available
        .iter()
        .fold(Value::default(), |acc, u| acc.add(&u.value));
    let buffer = fee::witness_fee_buffer(params, m_required);

    // spec §4.4 step 3 (SweepAll): one output carrying the min-ada floor
    // plus every swept token, and a plain-lovelace change output carrying
    // whatever coin is left once the primary output and fee are paid.
    let assemble_at_fee = |fee: u64| -> Result<(tx::UnsignedTx, Value, Option<Value>), BuildError> {
        let primary = Value {
            coin: min_ada_lovelace,
            assets: total.assets.clone(),
        };
        let spent = primary.add(&Value::coin(fee));
        let change = total
            .sub(&spent)
            .map_err(|_| BuildError::InsufficientAda { have: total.coin, need: spent.coin })?;
        let change = if change.is_empty() { None } else { Some(change) };

        let mut outputs = vec![(destination_address.to_string(), primary.clone())];
        if let Some(change_value) = &change {
            outputs.push((destination_address.to_string(), change_value.clone()));
        }
        let unsigned = tx::assemble(
            available,
            &outputs,
            fee,
            required_key_hashes,
            payment_script,
            network_id,
        )?;
        Ok((unsigned, primary, change))
    };

    let guess = fee_guess(params) + buffer;
    let (first_pass, _, _) = assemble_at_fee(guess)?;
    let actual_fee = params.min_fee(first_pass.size_bytes) + buffer;
    let (second_pass, primary, change) = assemble_at_fee(actual_fee)?;
    let reconfirm_fee = params.min_fee(second_pass.size_bytes) + buffer;
    if reconfirm_fee != actual_fee {
        return Err(BuildError::FeeDidNotConverge);
    }

    let mut outputs = vec![PreviewOutput {
        address: destination_address.to_string(),
        value: primary,
    }];
    if let Some(change_value) = change {
        outputs.push(PreviewOutput {
            address: destination_address.to_string(),
            value: change_value,
        });
    }

    tracing::info!(
        session_id = %second_pass.session_id,
        fee = actual_fee,
        inputs = available.len(),
        "built sweep-all transaction"
    );

    Ok(BuildArtifact {
        session_id: second_pass.session_id,
        body_bytes: second_pass.body_bytes,
        full_tx_bytes: second_pass.full_tx_bytes,
        fee: actual_fee,
        inputs: available.to_vec(),
        outputs,
    })
}

#[allow(clippy::too_many_arguments)]
fn build_explicit(
    multisig_address: &str,
    payment_script: &NativeScript,
    required_key_hashes: &BTreeSet<KeyHash>,
    m_required: u32,
    min_ada_lovelace: u64,
    network_id: u8,
    requested: Vec<RequestedOutput>,
    available: &[Utxo],
    params: &ProtocolParams,
) -> Result<BuildArtifact, BuildError> {
    if requested.is_empty() {
        return Err(BuildError::NoOutputsRequested);
    }

    let buffer = fee::witness_fee_buffer(params, m_required);

    let total_in = available
        .iter()
        .fold(Value::default(), |acc, u| acc.add(&u.value));

    let mut requested_total = Value::default();
    for out in &requested {
        let mut value = out.value.clone();
        value.ensure_min_ada_if_tokens(min_ada_lovelace);
        requested_total = requested_total.add(&value);
    }

    // Assets are fee-independent, so a shortfall here holds regardless of
    // which fee pass is being assembled — check it once up front rather
    // than re-deriving it from every `sub` underflow below (spec §1
    // Non-goal: naïve "consume all UTxOs" coin selection, no optimization).
    for (policy, names) in &requested_total.assets {
        for (name, qty) in names {
            if total_in.asset_quantity(policy, name) < *qty {
                return Err(BuildError::InsufficientTokens);
            }
        }
    }

    // spec §4.4 step 2/3 (Explicit) + §1 Non-goal: every controlled UTxO is
    // spent; leftover value (after the requested outputs and fee) returns
    // to the multisig address itself as change.
    let assemble_at_fee = |fee: u64| -> Result<(tx::UnsignedTx, Option<Value>), BuildError> {
        let required = requested_total.add(&Value::coin(fee));
        let change = total_in
            .sub(&required)
            .map_err(|_| BuildError::InsufficientAda { have: total_in.coin, need: required.coin })?;
        let change = if change.is_empty() { None } else { Some(change) };

        if let Some(change_value) = &change {
            if !change_value.assets.is_empty() && change_value.coin < min_ada_lovelace {
                return Err(BuildError::ChangeBelowMinAda);
            }
        }

        let mut outputs: Vec<(String, Value)> = requested
            .iter()
            .map(|o| {
                let mut v = o.value.clone();
                v.ensure_min_ada_if_tokens(min_ada_lovelace);
                (o.address.clone(), v)
            })
            .collect();
        if let Some(change_value) = &change {
            outputs.push((multisig_address.to_string(), change_value.clone()));
        }

        let unsigned = tx::assemble(available, &outputs, fee, required_key_hashes, payment_script, network_id)?;
        Ok((unsigned, change))
    };

    let guess = fee_guess(params) + buffer;
    let (first_pass, _) = assemble_at_fee(guess)?;
    let actual_fee = params.min_fee(first_pass.size_bytes) + buffer;
    let (second_pass, change) = assemble_at_fee(actual_fee)?;
    let reconfirm_fee = params.min_fee(second_pass.size_bytes) + buffer;
    if reconfirm_fee != actual_fee {
        return Err(BuildError::FeeDidNotConverge);
    }

    let mut outputs: Vec<PreviewOutput> = requested
        .into_iter()
        .map(|o| {
            let mut v = o.value.clone();
            v.ensure_min_ada_if_tokens(min_ada_lovelace);
            PreviewOutput { address: o.address, value: v }
        })
        .collect();
    if let Some(change_value) = change {
        outputs.push(PreviewOutput {
            address: multisig_address.to_string(),
            value: change_value,
        });
    }

    tracing::info!(
        session_id = %second_pass.session_id,
        fee = actual_fee,
        inputs = available.len(),
        "built explicit transaction"
    );

    Ok(BuildArtifact {
        session_id: second_pass.session_id,
        body_bytes: second_pass.body_bytes,
        full_tx_bytes: second_pass.full_tx_bytes,
        fee: actual_fee,
        inputs: available.to_vec(),
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use multisig_primitives::{AssetName, Network, PolicyId};
    use multisig_script::{derive_enterprise_address, NativeScript};

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

    fn one_of_one() -> (NativeScript, BTreeSet<KeyHash>, String) {
        let kh = KeyHash::from([0x01; 28]);
        let script = NativeScript::Pubkey(kh);
        let address = derive_enterprise_address(script.hash(), Network::Mainnet).unwrap();
        (script, BTreeSet::from([kh]), address)
    }

    fn utxo(coin: u64, assets: &[(u8, &[u8], u64)]) -> Utxo {
        let mut value = Value::coin(coin);
        for (policy_byte, name, qty) in assets {
            value
                .assets
                .entry(PolicyId::from([*policy_byte; 28]))
                .or_insert_with(BTreeMap::new)
                .insert(AssetName::new(name.to_vec()).unwrap(), *qty);
        }
        Utxo::new(TxHash::from([0xaa; 32]), 0, value)
    }

    /// Scenario 1: sweep, single coin-only UTxO.
    #[test]
    fn sweep_single_coin_only_utxo() {
        let (script, required, _multisig_address) = one_of_one();
        let input = utxo(10_000_000, &[]);
        let options = BuildOptions {
            multisig_address: "ignored for sweep".into(),
            payment_script: script,
            required_key_hashes: required,
            m_required: 1,
            min_ada_lovelace: 2_000_000,
            network_id: 1,
            mode: Mode::SweepAll { destination_address: "addr1destination".into() },
        };
        let artifact = build(options, &[input], &params()).unwrap();

        assert_eq!(artifact.outputs.len(), 2);
        assert_eq!(artifact.outputs[0].value.coin, 2_000_000);
        assert!(artifact.outputs[0].value.assets.is_empty());
        assert_eq!(artifact.outputs[1].value.coin, 10_000_000 - 2_000_000 - artifact.fee);
        assert!(artifact.outputs[1].value.assets.is_empty());

        let min_fee = params().min_fee(artifact.full_tx_bytes.len() as u64);
        let buffer = fee::witness_fee_buffer(&params(), 1);
        assert!(artifact.fee >= min_fee);
        assert!(artifact.fee <= min_fee + buffer);
    }

    /// Scenario 2: sweep with tokens.
    #[test]
    fn sweep_with_tokens() {
        let (script, required, _) = one_of_one();
        let input = utxo(5_000_000, &[(0x50, b"N", 7)]);
        let options = BuildOptions {
            multisig_address: "ignored for sweep".into(),
            payment_script: script,
            required_key_hashes: required,
            m_required: 1,
            min_ada_lovelace: 2_000_000,
            network_id: 1,
            mode: Mode::SweepAll { destination_address: "addr1destination".into() },
        };
        let artifact = build(options, &[input], &params()).unwrap();

        assert_eq!(artifact.outputs.len(), 2);
        assert_eq!(artifact.outputs[0].value.coin, 2_000_000);
        assert_eq!(
            artifact.outputs[0]
                .value
                .asset_quantity(&PolicyId::from([0x50; 28]), &AssetName::new(b"N".to_vec()).unwrap()),
            7
        );
        assert_eq!(artifact.outputs[1].value.coin, 5_000_000 - 2_000_000 - artifact.fee);
        assert!(artifact.outputs[1].value.assets.is_empty());
    }

    /// Scenario 3: explicit mode requesting more of a token than inputs carry.
    #[test]
    fn explicit_insufficient_tokens() {
        let (script, required, multisig_address) = one_of_one();
        let input = utxo(10_000_000, &[(0x51, b"N", 5)]);
        let mut requested = Value::coin(1_500_000);
        requested
            .assets
            .entry(PolicyId::from([0x51; 28]))
            .or_insert_with(BTreeMap::new)
            .insert(AssetName::new(b"N".to_vec()).unwrap(), 6);
        let options = BuildOptions {
            multisig_address,
            payment_script: script,
            required_key_hashes: required,
            m_required: 1,
            min_ada_lovelace: 2_000_000,
            network_id: 1,
            mode: Mode::Explicit {
                outputs: vec![RequestedOutput { address: "addr1x".into(), value: requested }],
            },
        };
        let err = build(options, &[input], &params()).unwrap_err();
        assert!(matches!(err, BuildError::InsufficientTokens));
    }

    /// Boundary: an empty UTxO set fails with InsufficientAda in sweep mode.
    #[test]
    fn empty_utxo_set_fails_sweep() {
        let (script, required, _) = one_of_one();
        let options = BuildOptions {
            multisig_address: "ignored".into(),
            payment_script: script,
            required_key_hashes: required,
            m_required: 1,
            min_ada_lovelace: 2_000_000,
            network_id: 1,
            mode: Mode::SweepAll { destination_address: "addr1destination".into() },
        };
        let err = build(options, &[], &params()).unwrap_err();
        assert!(matches!(err, BuildError::InsufficientAda { have: 0, .. }));
    }

    /// Boundary: an explicit output requesting all available tokens with a
    /// requested coin of 0 still gets its coin bumped to the min-ada floor,
    /// and the remainder correctly lands in change.
    #[test]
    fn explicit_zero_coin_output_is_bumped_to_min_ada() {
        let (script, required, multisig_address) = one_of_one();
        let input = utxo(10_000_000, &[(0x52, b"N", 3)]);
        let mut requested = Value::coin(0);
        requested
            .assets
            .entry(PolicyId::from([0x52; 28]))
            .or_insert_with(BTreeMap::new)
            .insert(AssetName::new(b"N".to_vec()).unwrap(), 3);
        let options = BuildOptions {
            multisig_address: multisig_address.clone(),
            payment_script: script,
            required_key_hashes: required,
            m_required: 1,
            min_ada_lovelace: 2_000_000,
            network_id: 1,
            mode: Mode::Explicit {
                outputs: vec![RequestedOutput { address: "addr1x".into(), value: requested }],
            },
        };
        let artifact = build(options, &[input], &params()).unwrap();
        assert_eq!(artifact.outputs[0].value.coin, 2_000_000);
        assert_eq!(artifact.outputs[1].address, multisig_address);
        assert_eq!(artifact.outputs[1].value.coin, 10_000_000 - 2_000_000 - artifact.fee);
    }

    /// Explicit mode consumes every controlled UTxO (spec §1 Non-goal:
    /// naïve "consume all UTxOs"), so an asset requirement that exceeds any
    /// single input's holding is still satisfiable by spending both, and
    /// conservation holds: the requested quantity plus the leftover change
    /// quantity equals the total the inputs carried.
    #[test]
    fn explicit_spans_multiple_utxos_for_a_single_asset_and_conserves() {
        let (script, required, multisig_address) = one_of_one();
        let policy = PolicyId::from([0x60; 28]);
        let name = AssetName::new(b"N".to_vec()).unwrap();
        let input_a = utxo(5_000_000, &[(0x60, b"N", 6)]);
        let input_b = utxo(5_000_000, &[(0x60, b"N", 6)]);

        let mut requested = Value::coin(2_000_000);
        requested.assets.entry(policy).or_insert_with(BTreeMap::new).insert(name.clone(), 10);
        let options = BuildOptions {
            multisig_address: multisig_address.clone(),
            payment_script: script,
            required_key_hashes: required,
            m_required: 1,
            min_ada_lovelace: 2_000_000,
            network_id: 1,
            mode: Mode::Explicit {
                outputs: vec![RequestedOutput { address: "addr1x".into(), value: requested }],
            },
        };
        let artifact = build(options, &[input_a, input_b], &params()).unwrap();

        assert_eq!(artifact.inputs.len(), 2);
        assert_eq!(artifact.outputs[0].value.asset_quantity(&policy, &name), 10);
        let change = &artifact.outputs[1];
        assert_eq!(change.address, multisig_address);
        assert_eq!(change.value.asset_quantity(&policy, &name), 2);
        assert_eq!(
            artifact.outputs[0].value.asset_quantity(&policy, &name) + change.value.asset_quantity(&policy, &name),
            12
        );
    }
}

use std::collections::{BTreeMap, BTreeSet};

use pallas::codec::utils::Bytes;
use pallas::crypto::hash::Hash;
use pallas::ledger::addresses::Address;
use pallas::ledger::primitives::conway::{
    NetworkId, PostAlonzoTransactionOutput, Set, Tx, TransactionBody, TransactionInput,
    TransactionOutput, Value as PallasValue, VKeyWitness, WitnessSet,
};
use pallas::ledger::primitives::{Fragment, NonEmptySet, PositiveCoin};
use pallas::ledger::traverse::ComputeHash;

use multisig_primitives::{KeyHash, TxHash, Utxo, Value};
use multisig_script::NativeScript;

use crate::error::BuildError;

/// Everything needed to turn a resolved set of inputs/outputs into wire
/// bytes. Keeps the conway plumbing in one place, the way `hose`'s
/// `StagingTransaction::build_conway` does, but stripped to only the fields
/// this system ever populates: no certificates, withdrawals, mint, Plutus
/// scripts or governance actions.
pub struct UnsignedTx {
    pub session_id: TxHash,
    pub body_bytes: Vec<u8>,
    pub full_tx_bytes: Vec<u8>,
    pub size_bytes: u64,
}

pub fn to_pallas_input(utxo: &Utxo) -> TransactionInput {
    TransactionInput {
        transaction_id: utxo.tx_hash,
        index: utxo.output_index as u64,
    }
}

pub fn to_pallas_output(address_bech32: &str, value: &Value) -> Result<TransactionOutput<'static>, BuildError> {
    let address = Address::from_bech32(address_bech32).map_err(|_| BuildError::InvalidAddress)?;

    let mut assets: BTreeMap<Hash<28>, BTreeMap<Bytes, PositiveCoin>> = BTreeMap::new();
    for (policy, names) in &value.assets {
        let mut inner = BTreeMap::new();
        for (name, quantity) in names {
            if let Ok(qty) = PositiveCoin::try_from(*quantity) {
                inner.insert(Bytes::from(name.as_bytes().to_vec()), qty);
            }
        }
        if !inner.is_empty() {
            assets.insert(*policy, inner);
        }
    }

    let pallas_value = if assets.is_empty() {
        PallasValue::Coin(value.coin)
    } else {
        PallasValue::Multiasset(value.coin, assets.into_iter().collect())
    };

    Ok(TransactionOutput::PostAlonzo(
        PostAlonzoTransactionOutput {
            address: address.to_vec().into(),
            value: pallas_value,
            datum_option: None,
            script_ref: None,
        }
        .into(),
    ))
}

/// Assemble the unsigned wire form of a transaction: body + attached native
/// script + empty vkey witness slot. No key witnesses are included — those
/// arrive later, one at a time, through witness intake (C6).
#[allow(clippy::too_many_arguments)]
pub fn assemble(
    inputs: &[Utxo],
    outputs: &[(String, Value)],
    fee: u64,
    required_key_hashes: &BTreeSet<KeyHash>,
    payment_script: &NativeScript,
    network_id: u8,
) -> Result<UnsignedTx, BuildError> {
    let mut pallas_inputs: Vec<TransactionInput> = inputs.iter().map(to_pallas_input).collect();
    pallas_inputs.sort_unstable_by_key(|i| (i.transaction_id, i.index));

    let pallas_outputs = outputs
        .iter()
        .map(|(address, value)| to_pallas_output(address, value))
        .collect::<Result<Vec<_>, _>>()?;

    let required_signers = NonEmptySet::from_vec(required_key_hashes.iter().copied().collect());

    let network_id = match network_id {
        0 => Some(NetworkId::Testnet),
        1 => Some(NetworkId::Mainnet),
        _ => return Err(BuildError::InvalidAddress),
    };

    let native_script_bytes = payment_script.to_bytes();
    let native_script = pallas::ledger::primitives::conway::NativeScript::decode_fragment(
        &native_script_bytes,
    )
    .map_err(|_| BuildError::InvalidScript)?;

    let body = TransactionBody {
        inputs: Set::from(pallas_inputs),
        outputs: pallas_outputs,
        fee,
        ttl: None,
        certificates: None,
        withdrawals: None,
        auxiliary_data_hash: None,
        validity_interval_start: None,
        mint: None,
        script_data_hash: None,
        collateral: None,
        required_signers,
        network_id,
        collateral_return: None,
        total_collateral: None,
        reference_inputs: None,
        voting_procedures: None,
        proposal_procedures: None,
        treasury_value: None,
        donation: None,
    };

    let body_bytes = body.encode_fragment().expect("transaction body always encodes");

    let pallas_tx: Tx = Tx {
        transaction_body: body.into(),
        transaction_witness_set: WitnessSet {
            vkeywitness: None,
            native_script: NonEmptySet::from_vec(vec![native_script.into()]),
            bootstrap_witness: None,
            plutus_v1_script: None,
            plutus_data: None,
            redeemer: None,
            plutus_v2_script: None,
            plutus_v3_script: None,
        }
        .into(),
        success: true,
        auxiliary_data: None.into(),
    };

    // `compute_hash` walks the raw captured bytes, not the in-memory struct,
    // so the hash is stable across re-encoding. Matches the convention in
    // `hose::builder::tx::staging::build::build_conway`.
    let session_id = TxHash::from(*pallas_tx.transaction_body.compute_hash());

    let full_tx_bytes = pallas_tx.encode_fragment().expect("transaction always encodes");

    Ok(UnsignedTx {
        session_id,
        size_bytes: full_tx_bytes.len() as u64,
        body_bytes,
        full_tx_bytes,
    })
}

/// Re-attach a set of collected vkey witnesses to a previously assembled
/// unsigned transaction, producing bytes ready for submission. Mirrors
/// `BuiltTransaction::add_signature` in `hose`, generalized to apply every
/// witness in one pass instead of one call per signature.
pub fn attach_witnesses(full_tx_bytes: &[u8], witnesses: &[(KeyHash, [u8; 32], [u8; 64])]) -> Vec<u8> {
    let mut tx = Tx::decode_fragment(full_tx_bytes).expect("session holds a well-formed unsigned tx");

    let vkey_witnesses: Vec<VKeyWitness> = witnesses
        .iter()
        .map(|(_, vkey, signature)| VKeyWitness {
            vkey: vkey.to_vec().into(),
            signature: signature.to_vec().into(),
        })
        .collect();

    tx.transaction_witness_set.vkeywitness = NonEmptySet::from_vec(vkey_witnesses);

    tx.encode_fragment().expect("transaction always encodes")
}

/// CBOR-encode a single collected witness as its own one-entry witness-set,
/// the shape spec §6 `list_witnesses` hands back per signer (`witness_hex`).
pub fn encode_single_key_witness_set(vkey: [u8; 32], signature: [u8; 64]) -> Vec<u8> {
    let witness_set = WitnessSet {
        vkeywitness: NonEmptySet::from_vec(vec![VKeyWitness {
            vkey: vkey.to_vec().into(),
            signature: signature.to_vec().into(),
        }]),
        native_script: None,
        bootstrap_witness: None,
        plutus_v1_script: None,
        plutus_data: None,
        redeemer: None,
        plutus_v2_script: None,
        plutus_v3_script: None,
    };

    witness_set.encode_fragment().expect("witness set always encodes")
}

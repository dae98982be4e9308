//! The coordination engine: builds unsigned transactions against a native
//! multisig script, holds in-flight signing sessions, and assembles and
//! submits them once enough witnesses arrive.
//!
//! Plays the role `hose::builder` plays for a single wallet, generalized to
//! a shared script controlled by several signers instead of one private key.

pub mod builder;
pub mod error;
pub mod session;

pub use builder::{build, encode_single_key_witness_set, BuildArtifact, BuildOptions, Mode, RequestedOutput};
pub use error::{BuildError, SessionError, WitnessError};
pub use session::{Session, SessionState, SessionStore, SubmitError, Witness, WitnessIntakeResult};

/// Exercises the whole coordination cycle against real ed25519 signatures —
/// build, §8 scenario 4/5's witness-gating, and a successful submit — across
/// the crate boundaries `multisig-core` sits between, the same way
/// `hose-devnet-tests` drives `hose::builder` end to end against a fake
/// instead of a live devnet (this system has no devnet to drive against, so
/// the fake is a `ChainGateway` impl rather than a `NodeClient`).
#[cfg(test)]
mod integration_tests {
    use std::collections::BTreeSet;
    use std::convert::Infallible;
    use std::sync::Mutex;

    use pallas::crypto::key::ed25519::SecretKey;
    use pallas::ledger::primitives::conway::{NonEmptySet, VKeyWitness, WitnessSet};
    use pallas::ledger::primitives::Fragment;

    use multisig_gateway::ChainGateway;
    use multisig_primitives::{KeyHash, Network, ProtocolParams, TxHash, Utxo, Value};
    use multisig_script::{derive_enterprise_address, NativeScript};

    use crate::builder::{build, BuildOptions, Mode};
    use crate::session::{submit, submit_witness_blob, Session, SessionState};

    struct FakeGateway {
        submitted: Mutex<Option<Vec<u8>>>,
    }

    impl ChainGateway for FakeGateway {
        type Error = Infallible;

        async fn utxos_at(&self, _address: &str) -> Result<Vec<Utxo>, Self::Error> {
            unreachable!("this test only exercises submit, not a live fetch")
        }

        async fn protocol_parameters(&self) -> Result<ProtocolParams, Self::Error> {
            unreachable!("this test only exercises submit, not a live fetch")
        }

        async fn submit(&self, signed_tx_bytes: &[u8]) -> Result<TxHash, Self::Error> {
            *self.submitted.lock().unwrap() = Some(signed_tx_bytes.to_vec());
            Ok(TxHash::from([0x99; 32]))
        }
    }

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

    fn witness_blob(vkey: [u8; 32], signature: [u8; 64]) -> Vec<u8> {
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

    fn key_hash_of(vkey: &[u8; 32]) -> KeyHash {
        let mut hasher = pallas::crypto::hash::Hasher::<224>::new();
        hasher.input(vkey);
        hasher.finalize()
    }

    /// Scenarios 5 and 6: a 2-of-2 script gates submission on both
    /// signatures arriving, then assembles and submits once they have.
    #[tokio::test]
    async fn two_of_two_build_collect_and_submit() {
        let key_a = SecretKey::from([0x01; 32]);
        let key_b = SecretKey::from([0x02; 32]);
        let vkey_a: [u8; 32] = key_a.public_key().as_ref().try_into().unwrap();
        let vkey_b: [u8; 32] = key_b.public_key().as_ref().try_into().unwrap();
        let kh_a = key_hash_of(&vkey_a);
        let kh_b = key_hash_of(&vkey_b);

        let script = NativeScript::AtLeast(2, vec![NativeScript::Pubkey(kh_a), NativeScript::Pubkey(kh_b)]);
        let required = BTreeSet::from([kh_a, kh_b]);
        let destination = derive_enterprise_address(
            pallas::crypto::hash::Hash::<28>::from([0x77; 28]),
            Network::Mainnet,
        )
        .unwrap();
        let input = Utxo::new(TxHash::from([0xaa; 32]), 0, Value::coin(10_000_000));

        let options = BuildOptions {
            multisig_address: "unused for sweep".into(),
            payment_script: script,
            required_key_hashes: required.clone(),
            m_required: 2,
            min_ada_lovelace: 2_000_000,
            network_id: 1,
            mode: Mode::SweepAll { destination_address: destination },
        };
        let artifact = build(options, &[input], &params()).unwrap();
        let mut session = Session::new(artifact, 2, required);

        let signature_a: [u8; 64] = key_a.sign(session.session_id.as_ref()).as_ref().try_into().unwrap();
        let blob_a = witness_blob(vkey_a, signature_a);
        let result_a = submit_witness_blob(&mut session, &blob_a).unwrap();
        assert_eq!(result_a.accepted, vec![kh_a]);

        let gateway = FakeGateway { submitted: Mutex::new(None) };

        // Scenario 5: collected == m - 1 fails with no network call.
        let err = submit(&mut session, &gateway).await.unwrap_err();
        assert!(matches!(
            err,
            crate::SubmitError::Threshold(crate::SessionError::ThresholdNotMet { have: 1, need: 2 })
        ));
        assert!(gateway.submitted.lock().unwrap().is_none());

        let signature_b: [u8; 64] = key_b.sign(session.session_id.as_ref()).as_ref().try_into().unwrap();
        let blob_b = witness_blob(vkey_b, signature_b);
        submit_witness_blob(&mut session, &blob_b).unwrap();

        let tx_hash = submit(&mut session, &gateway).await.unwrap();
        assert_eq!(tx_hash, TxHash::from([0x99; 32]));
        assert_eq!(session.state, SessionState::Submitted { tx_hash });
        assert!(gateway.submitted.lock().unwrap().is_some());
    }
}

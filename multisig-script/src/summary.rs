use std::collections::BTreeSet;

use multisig_primitives::KeyHash;

use crate::error::ScriptError;
use crate::tree::NativeScript;

/// Everything the rest of the system needs to know about a native script,
/// derived by a single recursive walk (spec §3/§4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSummary {
    pub m_required: u32,
    pub required_key_hashes: BTreeSet<KeyHash>,
    pub script_hash: pallas::crypto::hash::Hash<28>,
    pub invalid_before: Option<u64>,
    pub invalid_hereafter: Option<u64>,
}

impl ScriptSummary {
    pub fn from_bytes(script_bytes: &[u8]) -> Result<Self, ScriptError> {
        let script = NativeScript::from_bytes(script_bytes)?;
        Ok(Self::summarize(&script))
    }

    pub fn summarize(script: &NativeScript) -> Self {
        let mut key_hashes = BTreeSet::new();
        let mut at_least_n = Vec::new();
        let mut any_present = false;
        let mut invalid_before = None;
        let mut invalid_hereafter = None;

        walk(
            script,
            &mut key_hashes,
            &mut at_least_n,
            &mut any_present,
            &mut invalid_before,
            &mut invalid_hereafter,
        );

        // Derivation rule, spec §3:
        //   - any AtLeast(n, ...) present -> max(n)
        //   - else any Any(...) present -> 1
        //   - else -> |required_key_hashes| (treat tree as All)
        let m_required = if let Some(max_n) = at_least_n.into_iter().max() {
            max_n
        } else if any_present {
            1
        } else {
            key_hashes.len() as u32
        };

        ScriptSummary {
            m_required,
            required_key_hashes: key_hashes,
            script_hash: script.hash(),
            invalid_before,
            invalid_hereafter,
        }
    }
}

fn walk(
    node: &NativeScript,
    key_hashes: &mut BTreeSet<KeyHash>,
    at_least_n: &mut Vec<u32>,
    any_present: &mut bool,
    invalid_before: &mut Option<u64>,
    invalid_hereafter: &mut Option<u64>,
) {
    match node {
        NativeScript::Pubkey(kh) => {
            key_hashes.insert(*kh);
        }
        NativeScript::All(children) => {
            for child in children {
                walk(child, key_hashes, at_least_n, any_present, invalid_before, invalid_hereafter);
            }
        }
        NativeScript::Any(children) => {
            *any_present = true;
            for child in children {
                walk(child, key_hashes, at_least_n, any_present, invalid_before, invalid_hereafter);
            }
        }
        NativeScript::AtLeast(n, children) => {
            at_least_n.push(*n);
            for child in children {
                walk(child, key_hashes, at_least_n, any_present, invalid_before, invalid_hereafter);
            }
        }
        NativeScript::InvalidBefore(slot) => {
            *invalid_before = Some(invalid_before.map_or(*slot, |cur| cur.max(*slot)));
        }
        NativeScript::InvalidHereafter(slot) => {
            *invalid_hereafter = Some(invalid_hereafter.map_or(*slot, |cur| cur.min(*slot)));
        }
    }
}

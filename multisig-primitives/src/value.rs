use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// A 28-byte policy id.
pub type PolicyId = pallas::crypto::hash::Hash<28>;

/// An asset name: 0-32 raw bytes, canonically displayed as hex.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AssetName(Vec<u8>);

impl AssetName {
    pub fn new(bytes: Vec<u8>) -> Result<Self, InvalidUnit> {
        if bytes.len() > 32 {
            return Err(InvalidUnit::AssetNameTooLong);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidUnit {
    #[error("unit is not valid hex")]
    NotHex,
    #[error("unit has the wrong length, expected {expected} bytes")]
    WrongLength { expected: usize },
    #[error("asset name must be 32 bytes or fewer")]
    AssetNameTooLong,
}

/// A (coin, multi-asset) value, per spec §3.
///
/// Every leaf quantity is strictly positive; zero entries are pruned by
/// construction so two values with the same non-zero content always compare
/// equal regardless of how they were built up.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Value {
    pub coin: u64,
    pub assets: BTreeMap<PolicyId, BTreeMap<AssetName, u64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("value arithmetic underflowed")]
pub struct Underflow;

impl Value {
    pub fn coin(coin: u64) -> Self {
        Self {
            coin,
            assets: BTreeMap::new(),
        }
    }

    /// Parse the wire representation used throughout spec §6: `"lovelace"`
    /// for the native coin, or `policy(56 hex) || name(0-64 hex)` for a
    /// native-asset unit.
    pub fn parse_unit(unit: &str) -> Result<Option<(PolicyId, AssetName)>, InvalidUnit> {
        if unit == "lovelace" {
            return Ok(None);
        }
        if unit.len() < 56 {
            return Err(InvalidUnit::WrongLength { expected: 28 });
        }
        let (policy_hex, name_hex) = unit.split_at(56);
        let policy_bytes = hex::decode(policy_hex).map_err(|_| InvalidUnit::NotHex)?;
        let policy_array: [u8; 28] = policy_bytes
            .try_into()
            .map_err(|_| InvalidUnit::WrongLength { expected: 28 })?;
        let name_bytes = hex::decode(name_hex).map_err(|_| InvalidUnit::NotHex)?;
        let name = AssetName::new(name_bytes)?;
        Ok(Some((PolicyId::from(policy_array), name)))
    }

    /// Build a value from the `[(unit, quantity)]` wire shape (spec §6).
    pub fn from_wire(entries: &[(String, u64)]) -> Result<Self, InvalidUnit> {
        let mut value = Value::default();
        for (unit, quantity) in entries {
            match Value::parse_unit(unit)? {
                None => value.coin = value.coin.saturating_add(*quantity),
                Some((policy, name)) => {
                    *value.assets.entry(policy).or_default().entry(name).or_insert(0) += quantity;
                }
            }
        }
        Ok(value.pruned())
    }

    pub fn is_empty(&self) -> bool {
        self.coin == 0 && self.assets.is_empty()
    }

    /// Drop zero-quantity leaves and the policy maps they leave empty.
    fn pruned(mut self) -> Self {
        self.assets.retain(|_, names| {
            names.retain(|_, qty| *qty > 0);
            !names.is_empty()
        });
        self
    }

    pub fn add(&self, other: &Value) -> Value {
        let mut out = self.clone();
        out.coin = out.coin.saturating_add(other.coin);
        for (policy, names) in &other.assets {
            let entry = out.assets.entry(*policy).or_default();
            for (name, qty) in names {
                *entry.entry(name.clone()).or_insert(0) += qty;
            }
        }
        out.pruned()
    }

    pub fn sub(&self, other: &Value) -> Result<Value, Underflow> {
        let coin = self.coin.checked_sub(other.coin).ok_or(Underflow)?;
        let mut assets = self.assets.clone();
        for (policy, names) in &other.assets {
            for (name, qty) in names {
                let have = assets
                    .get(policy)
                    .and_then(|m| m.get(name))
                    .copied()
                    .unwrap_or(0);
                let remaining = have.checked_sub(*qty).ok_or(Underflow)?;
                let entry = assets.entry(*policy).or_default();
                if remaining == 0 {
                    entry.remove(name);
                } else {
                    entry.insert(name.clone(), remaining);
                }
            }
        }
        assets.retain(|_, names| !names.is_empty());
        Ok(Value { coin, assets })
    }

    /// Same as [`sub`](Self::sub), but clamps every component at zero
    /// instead of failing. Used by the builder to compute "how much more do
    /// I still need" without caring about the sign.
    pub fn saturating_sub(&self, other: &Value) -> Value {
        let coin = self.coin.saturating_sub(other.coin);
        let mut assets = BTreeMap::new();
        for (policy, names) in &self.assets {
            for (name, qty) in names {
                let have_in_other = other
                    .assets
                    .get(policy)
                    .and_then(|m| m.get(name))
                    .copied()
                    .unwrap_or(0);
                let remaining = qty.saturating_sub(have_in_other);
                if remaining > 0 {
                    assets
                        .entry(*policy)
                        .or_insert_with(BTreeMap::new)
                        .insert(name.clone(), remaining);
                }
            }
        }
        Value { coin, assets }.pruned()
    }

    /// Bump `coin` up to `floor` if this value carries any tokens, per the
    /// min-ADA invariant in spec §3/§8. No-op otherwise.
    pub fn ensure_min_ada_if_tokens(&mut self, floor: u64) {
        if !self.assets.is_empty() && self.coin < floor {
            self.coin = floor;
        }
    }

    /// Quantity of a specific asset held in this value (0 if absent).
    pub fn asset_quantity(&self, policy: &PolicyId, name: &AssetName) -> u64 {
        self.assets
            .get(policy)
            .and_then(|m| m.get(name))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(byte: u8) -> PolicyId {
        PolicyId::from([byte; 28])
    }

    #[test]
    fn add_is_componentwise() {
        let mut a = Value::coin(10);
        a.assets.entry(policy(1)).or_default().insert(AssetName::new(vec![b'A']).unwrap(), 5);
        let b = Value::coin(3);
        let sum = a.add(&b);
        assert_eq!(sum.coin, 13);
        assert_eq!(sum.asset_quantity(&policy(1), &AssetName::new(vec![b'A']).unwrap()), 5);
    }

    #[test]
    fn sub_fails_on_underflow() {
        let a = Value::coin(5);
        let b = Value::coin(6);
        assert_eq!(a.sub(&b), Err(Underflow));
    }

    #[test]
    fn sub_prunes_zero_leaves() {
        let name = AssetName::new(vec![1, 2, 3]).unwrap();
        let mut a = Value::coin(0);
        a.assets.entry(policy(9)).or_default().insert(name.clone(), 7);
        let mut b = Value::coin(0);
        b.assets.entry(policy(9)).or_default().insert(name, 7);
        let diff = a.sub(&b).unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn is_empty_true_only_when_no_coin_and_no_assets() {
        assert!(Value::default().is_empty());
        assert!(!Value::coin(1).is_empty());
    }

    #[test]
    fn ensure_min_ada_only_bumps_token_bearing_values() {
        let mut coin_only = Value::coin(100);
        coin_only.ensure_min_ada_if_tokens(2_000_000);
        assert_eq!(coin_only.coin, 100);

        let mut with_tokens = Value::coin(100);
        with_tokens.assets.entry(policy(2)).or_default().insert(AssetName::new(vec![]).unwrap(), 1);
        with_tokens.ensure_min_ada_if_tokens(2_000_000);
        assert_eq!(with_tokens.coin, 2_000_000);
    }

    #[test]
    fn parse_unit_splits_policy_and_name() {
        assert!(Value::parse_unit("lovelace").unwrap().is_none());
        let unit = format!("{}{}", "11".repeat(28), hex::encode(b"TOKEN"));
        let (policy, name) = Value::parse_unit(&unit).unwrap().unwrap();
        assert_eq!(policy, PolicyId::from([0x11; 28]));
        assert_eq!(name.as_bytes(), b"TOKEN");
    }
}

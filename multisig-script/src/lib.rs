//! Native script analysis (C3): parsing a serialized native-script tree,
//! deriving its effective threshold and required signers, and deriving the
//! controlled address from its hash.
//!
//! Grounded on how `hose` walks and (de)serializes `conway::NativeScript`
//! (`hose/src/builder/tx/staging/build.rs`) and hashes scripts with a
//! language tag (`Hasher::<224>::hash_tagged`, see
//! `hose/src/builder/tx/staging/mod.rs`'s sibling `staging_tx.rs`).

mod address;
mod error;
mod summary;
mod tree;

pub use address::{derive_base_address, derive_enterprise_address};
pub use error::ScriptError;
pub use summary::ScriptSummary;
pub use tree::NativeScript;

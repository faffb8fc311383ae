//! Ledger aggregate owning the persisted collections.

#[allow(clippy::module_inception)]
pub mod ledger;

pub use ledger::{Ledger, CURRENT_SCHEMA_VERSION};

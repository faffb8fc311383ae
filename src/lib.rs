#![doc(test(attr(deny(warnings))))]

//! Ledger Core implements a double-entry bookkeeping engine: a chart of
//! accounts, journal entries with a draft-to-posted lifecycle, an
//! append-only change log, and derived financial reports (trial balance,
//! income statement, balance sheet, dashboard summary).
//!
//! State lives in a [`ledger::Ledger`] aggregate owned by a
//! [`core::LedgerStore`], which persists synchronously to a pluggable
//! key-value backend after every mutation.

pub mod core;
pub mod domain;
pub mod errors;
pub mod ledger;
pub mod storage;

pub use crate::core::{ExportCategory, LedgerStore};
pub use crate::errors::{LedgerError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("ledger_core=info".parse().unwrap());
        fmt().with_env_filter(filter).init();
        tracing::info!("Ledger Core tracing initialized.");
    });
}

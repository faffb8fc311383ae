use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entry::EntryStatus;

/// Unified error type for domain validation, lifecycle, and storage failures.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Invalid journal line: {0}")]
    InvalidLine(String),
    #[error("Entry does not balance: debits {debit} != credits {credit}")]
    UnbalancedEntry { debit: Decimal, credit: Decimal },
    #[error("Account in use: {0}")]
    AccountInUse(String),
    #[error("Duplicate account code: {0}")]
    DuplicateAccountCode(String),
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidStateTransition { from: EntryStatus, to: EntryStatus },
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),
    #[error("Journal entry not found: {0}")]
    EntryNotFound(Uuid),
    #[error("Persistence error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

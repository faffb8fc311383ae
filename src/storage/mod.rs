pub mod json_backend;
pub mod memory;

use crate::errors::Result;

/// Fixed persistence keys; each holds a JSON document.
pub const ACCOUNTS_KEY: &str = "accounting.accounts";
pub const ENTRIES_KEY: &str = "accounting.journalEntries";
pub const CHANGE_LOG_KEY: &str = "accounting.changeLog";
/// Schema version, timestamps, and the per-period entry-number counters.
pub const META_KEY: &str = "accounting.meta";

/// Abstraction over durable key-value media capable of storing the ledger
/// snapshot. Implementations must make `write` all-or-nothing per key.
pub trait StorageBackend: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, payload: &str) -> Result<()>;
}

pub use json_backend::JsonStorage;
pub use memory::MemoryStorage;

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use crate::errors::{LedgerError, Result};

use super::StorageBackend;

/// In-memory backend used by tests and short-lived sessions. Writes can be
/// switched to fail so callers can exercise rollback paths.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `write` return a storage error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| LedgerError::Storage("memory store lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, payload: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LedgerError::Storage("simulated write failure".into()));
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| LedgerError::Storage("memory store lock poisoned".into()))?;
        entries.insert(key.to_string(), payload.to_string());
        Ok(())
    }
}

// Lets tests hold a handle to the backend after handing the store its own
// boxed copy.
impl StorageBackend for std::sync::Arc<MemoryStorage> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.as_ref().read(key)
    }

    fn write(&self, key: &str, payload: &str) -> Result<()> {
        self.as_ref().write(key, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failing_writes_surface_storage_errors() {
        let storage = MemoryStorage::new();
        storage.write("k", "v").expect("write succeeds");
        storage.set_fail_writes(true);
        let err = storage.write("k", "v2").expect_err("write should fail");
        assert!(matches!(err, LedgerError::Storage(_)));
        storage.set_fail_writes(false);
        assert_eq!(storage.read("k").unwrap().as_deref(), Some("v"));
    }
}

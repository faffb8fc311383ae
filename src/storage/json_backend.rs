use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::core::utils::{app_data_dir, ensure_dir};
use crate::errors::Result;

use super::StorageBackend;

const TMP_SUFFIX: &str = "tmp";

/// File-backed key-value store: one `<key>.json` document per key under a
/// root directory, written atomically via a staging file plus rename.
#[derive(Clone)]
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let root = root.unwrap_or_else(app_data_dir);
        ensure_dir(&root)?;
        Ok(Self { root })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl StorageBackend for JsonStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&self, key: &str, payload: &str) -> Result<()> {
        let path = self.key_path(key);
        let tmp = tmp_path(&path);
        write_atomic(&tmp, payload)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage_with_temp_dir() -> (JsonStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage = JsonStorage::new(Some(temp.path().to_path_buf())).expect("json storage");
        (storage, temp)
    }

    #[test]
    fn read_missing_key_returns_none() {
        let (storage, _guard) = storage_with_temp_dir();
        assert!(storage.read("accounting.accounts").unwrap().is_none());
    }

    #[test]
    fn write_then_read_roundtrip() {
        let (storage, _guard) = storage_with_temp_dir();
        storage.write("accounting.accounts", "[]").expect("write");
        let payload = storage.read("accounting.accounts").expect("read");
        assert_eq!(payload.as_deref(), Some("[]"));
    }

    #[test]
    fn write_replaces_previous_payload() {
        let (storage, _guard) = storage_with_temp_dir();
        storage.write("accounting.meta", "{\"a\":1}").unwrap();
        storage.write("accounting.meta", "{\"a\":2}").unwrap();
        let payload = storage.read("accounting.meta").unwrap();
        assert_eq!(payload.as_deref(), Some("{\"a\":2}"));
    }
}

//! Durable key/value storage for the session.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

use crate::config::{Config, SessionBackend};

use super::KeyringStorage;

/// Where the session lives between runs.
///
/// Keys are small fixed names; values are opaque strings. Removing a key
/// that does not exist is not an error.
pub trait SessionStorage: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// One file per key in a private data directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session key: {}", key))?;
        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .context("Failed to create session directory")?;
        std::fs::write(self.path(key), value)
            .with_context(|| format!("Failed to write session key: {}", key))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path(key);
        if path.exists() {
            std::fs::remove_file(path)
                .with_context(|| format!("Failed to remove session key: {}", key))?;
        }
        Ok(())
    }
}

/// In-process storage. Clones share the same map, so a test can keep a
/// handle and inspect what the store persisted.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().map(|e| e.is_empty()).unwrap_or(true)
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("session storage lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("session storage lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("session storage lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

/// Build the storage backend selected in the config.
pub fn open_storage(config: &Config) -> Result<Box<dyn SessionStorage>> {
    match config.session_backend {
        SessionBackend::File => Ok(Box::new(FileStorage::new(Config::data_dir()?))),
        SessionBackend::Keyring => Ok(Box::new(KeyringStorage::new())),
        SessionBackend::Memory => Ok(Box::new(MemoryStorage::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().join("emsa"));

        assert_eq!(storage.get("emsa_token").unwrap(), None);
        storage.set("emsa_token", "abc").unwrap();
        assert_eq!(storage.get("emsa_token").unwrap().as_deref(), Some("abc"));

        storage.remove("emsa_token").unwrap();
        assert_eq!(storage.get("emsa_token").unwrap(), None);
    }

    #[test]
    fn test_file_storage_remove_missing_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().to_path_buf());
        assert!(storage.remove("never_written").is_ok());
    }

    #[test]
    fn test_memory_storage_clones_share_entries() {
        let storage = MemoryStorage::new();
        let handle = storage.clone();
        storage.set("k", "v").unwrap();
        assert_eq!(handle.get("k").unwrap().as_deref(), Some("v"));
        handle.remove("k").unwrap();
        assert!(storage.is_empty());
    }
}

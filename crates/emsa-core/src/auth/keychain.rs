use anyhow::{Context, Result};
use keyring::Entry;

use super::SessionStorage;

const SERVICE_NAME: &str = "emsa";

/// Session storage in the OS keychain, one entry per key.
#[derive(Default)]
pub struct KeyringStorage;

impl KeyringStorage {
    pub fn new() -> Self {
        Self
    }
}

impl SessionStorage for KeyringStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entry = Entry::new(SERVICE_NAME, key)
            .context("Failed to create keyring entry")?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read session from keychain"),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, key)
            .context("Failed to create keyring entry")?;
        entry
            .set_password(value)
            .context("Failed to store session in keychain")?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, key)
            .context("Failed to create keyring entry")?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete session from keychain"),
        }
    }
}

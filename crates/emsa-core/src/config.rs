//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the API base URL, the last username used to sign in, and where the
//! session is persisted.
//!
//! Configuration is stored at `~/.config/emsa/config.json`. Environment
//! variables override the file for the current run only.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::DEFAULT_BASE_URL;

/// Application name used for config/cache/data directory paths
const APP_NAME: &str = "emsa";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_API_URL: &str = "EMSA_API_URL";
pub const ENV_USERNAME: &str = "EMSA_USERNAME";
pub const ENV_PASSWORD: &str = "EMSA_PASSWORD";
pub const ENV_SESSION_BACKEND: &str = "EMSA_SESSION_BACKEND";

/// Where the session token and profile are kept between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    File,
    Keyring,
    /// Nothing survives the process.
    Memory,
}

impl FromStr for SessionBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(SessionBackend::File),
            "keyring" | "keychain" => Ok(SessionBackend::Keyring),
            "memory" | "none" => Ok(SessionBackend::Memory),
            other => Err(anyhow::anyhow!("Unknown session backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_username: Option<String>,
    #[serde(default)]
    pub session_backend: SessionBackend,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load the config file, falling back to defaults on any failure.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {:#}", e);
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents).context("Failed to write config file")?;
        Ok(())
    }

    /// Apply `EMSA_API_URL` and `EMSA_SESSION_BACKEND` from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = Some(url);
        }
        if let Some(backend) = lookup(ENV_SESSION_BACKEND) {
            match backend.parse() {
                Ok(backend) => self.session_backend = backend,
                Err(e) => warn!("Ignoring {}: {:#}", ENV_SESSION_BACKEND, e),
            }
        }
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for file-backed session storage.
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn cache_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn log_dir() -> Result<PathBuf> {
        Ok(Self::cache_dir()?.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("config.json")).unwrap();
        assert_eq!(config.api_base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.session_backend, SessionBackend::File);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("emsa").join("config.json");
        let config = Config {
            api_base_url: Some("https://hr.example.com/api".to_string()),
            last_username: Some("jdoe".to_string()),
            session_backend: SessionBackend::Keyring,
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_base_url(), "https://hr.example.com/api");
        assert_eq!(loaded.last_username.as_deref(), Some("jdoe"));
        assert_eq!(loaded.session_backend, SessionBackend::Keyring);
    }

    #[test]
    fn test_older_file_without_backend() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_base_url": null, "last_username": "a"}"#).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.session_backend, SessionBackend::File);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_with(|key| match key {
            ENV_API_URL => Some("http://10.0.0.5:8080/api".to_string()),
            ENV_SESSION_BACKEND => Some("Keyring".to_string()),
            _ => None,
        });
        assert_eq!(config.api_base_url(), "http://10.0.0.5:8080/api");
        assert_eq!(config.session_backend, SessionBackend::Keyring);
    }

    #[test]
    fn test_invalid_backend_env_is_ignored() {
        let mut config = Config::default();
        config.apply_env_with(|key| (key == ENV_SESSION_BACKEND).then(|| "floppy".to_string()));
        assert_eq!(config.session_backend, SessionBackend::File);
        assert!("memory".parse::<SessionBackend>().is_ok());
    }
}

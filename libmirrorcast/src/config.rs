//! Configuration management for Mirrorcast

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Account handles to monitor, processed in listed order
    pub accounts: Vec<String>,
    pub mirror: MirrorConfig,
    pub nostr: NostrConfig,
    pub state: StateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Base URL of the Nitter-style mirror instance
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NostrConfig {
    /// File containing the bech32 (nsec) signing key
    pub keys_file: String,
    pub relays: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    pub path: String,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Validate the configuration before any account is processed
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required field is missing or empty.
    /// Validation happens exactly once at startup; the rest of the code
    /// assumes a well-formed config.
    pub fn validate(&self) -> Result<()> {
        if self.accounts.is_empty() {
            return Err(ConfigError::MissingField("accounts".to_string()).into());
        }
        if self.accounts.iter().any(|a| a.trim().is_empty()) {
            return Err(ConfigError::Invalid("account handle is empty".to_string()).into());
        }
        if self.mirror.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("mirror.base_url".to_string()).into());
        }
        if self.nostr.keys_file.trim().is_empty() {
            return Err(ConfigError::MissingField("nostr.keys_file".to_string()).into());
        }
        if self.nostr.relays.is_empty() {
            return Err(ConfigError::MissingField("nostr.relays".to_string()).into());
        }
        if self.state.path.trim().is_empty() {
            return Err(ConfigError::MissingField("state.path".to_string()).into());
        }
        Ok(())
    }

    /// Read the signing credential from the configured keys file
    pub fn load_credential(&self) -> Result<String> {
        let expanded = shellexpand::tilde(&self.nostr.keys_file).to_string();
        let content = std::fs::read_to_string(&expanded).map_err(|e| {
            ConfigError::Invalid(format!("Failed to read keys file {}: {}", expanded, e))
        })?;
        Ok(content.trim().to_string())
    }

    /// Expanded path of the state file
    pub fn state_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.state.path).to_string())
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("MIRRORCAST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("mirrorcast").join("config.toml"))
}

//! Per-account last-seen state persistence
//!
//! State lives in a single human-inspectable JSON file, rewritten
//! wholesale after every successful publish. The loader tolerates a
//! missing file, the legacy single-account shape from older deployments,
//! and outright corruption; all three degrade to an empty mapping with a
//! warning rather than aborting the run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Result, StateError};

/// Last-seen record for one monitored account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountState {
    pub last_post_id: Option<String>,
    pub last_updated: DateTime<Utc>,
}

/// On-disk shape: mapping keyed by account handle plus an overall stamp
///
/// The presence of the `accounts` key is what distinguishes the current
/// schema from the legacy single-account shape.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StateFile {
    pub accounts: HashMap<String, AccountState>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Store for reading and updating the state file
pub struct StateStore {
    path: PathBuf,
    state: StateFile,
}

impl StateStore {
    /// Open the store, loading whatever is currently on disk
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let state = read_state_file(&path);
        Self { path, state }
    }

    /// Last seen post id for an account, if any
    pub fn last_post_id(&self, account: &str) -> Option<&str> {
        self.state
            .accounts
            .get(account)
            .and_then(|s| s.last_post_id.as_deref())
    }

    /// Record a confirmed publish and persist the whole file immediately
    ///
    /// Persistence is per account, not batched across the run, so a crash
    /// partway through cannot lose progress already made.
    pub fn record_published(&mut self, account: &str, post_id: &str) -> Result<()> {
        let now = Utc::now();
        self.state.accounts.insert(
            account.to_string(),
            AccountState {
                last_post_id: Some(post_id.to_string()),
                last_updated: now,
            },
        );
        self.state.last_updated = Some(now);
        self.save()
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.state).map_err(StateError::SerializeError)?;
        std::fs::write(&self.path, json).map_err(StateError::WriteError)?;
        Ok(())
    }

    #[cfg(test)]
    pub fn accounts(&self) -> &HashMap<String, AccountState> {
        &self.state.accounts
    }
}

/// Schema-probing loader with explicit legacy migration
///
/// Probes the raw JSON before the typed decode: a top-level object
/// without an `accounts` key but with `last_post_id` is the legacy
/// single-account shape, which migrates to an empty mapping (the old
/// last-seen id is deliberately discarded; the warning makes the
/// one-time repost risk visible to operators).
fn read_state_file(path: &Path) -> StateFile {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return StateFile::default();
        }
        Err(e) => {
            warn!("Could not read state file {}: {}", path.display(), e);
            return StateFile::default();
        }
    };

    let value: serde_json::Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            warn!(
                "State file {} is corrupt, starting from empty state: {}",
                path.display(),
                e
            );
            return StateFile::default();
        }
    };

    if value.get("accounts").is_none() {
        if value.get("last_post_id").is_some() {
            warn!(
                "State file {} uses the legacy single-account shape; migrating to empty per-account state",
                path.display()
            );
        } else {
            warn!(
                "State file {} has no accounts mapping, starting from empty state",
                path.display()
            );
        }
        return StateFile::default();
    }

    match serde_json::from_value(value) {
        Ok(state) => state,
        Err(e) => {
            warn!(
                "State file {} did not match the expected schema, starting from empty state: {}",
                path.display(),
                e
            );
            StateFile::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn state_path(dir: &TempDir) -> PathBuf {
        dir.path().join("state.json")
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::load(state_path(&dir));

        assert!(store.accounts().is_empty());
        assert_eq!(store.last_post_id("alice"), None);
    }

    #[test]
    fn test_legacy_single_account_shape_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = state_path(&dir);
        std::fs::write(
            &path,
            r#"{"last_post_id": "99", "last_updated": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        let store = StateStore::load(&path);
        assert!(store.accounts().is_empty());
        assert_eq!(store.last_post_id("alice"), None);
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = state_path(&dir);
        std::fs::write(&path, "{not json at all").unwrap();

        let store = StateStore::load(&path);
        assert!(store.accounts().is_empty());
    }

    #[test]
    fn test_record_published_persists_immediately() {
        let dir = TempDir::new().unwrap();
        let path = state_path(&dir);

        let mut store = StateStore::load(&path);
        store.record_published("alice", "1234567890").unwrap();

        // Reload from disk: the write must already be visible
        let reloaded = StateStore::load(&path);
        assert_eq!(reloaded.last_post_id("alice"), Some("1234567890"));
    }

    #[test]
    fn test_record_published_replaces_previous_id() {
        let dir = TempDir::new().unwrap();
        let path = state_path(&dir);

        let mut store = StateStore::load(&path);
        store.record_published("alice", "100").unwrap();
        store.record_published("alice", "200").unwrap();

        assert_eq!(store.last_post_id("alice"), Some("200"));
        assert_eq!(store.accounts().len(), 1);
    }

    #[test]
    fn test_accounts_are_independent() {
        let dir = TempDir::new().unwrap();
        let path = state_path(&dir);

        let mut store = StateStore::load(&path);
        store.record_published("alice", "100").unwrap();
        store.record_published("bob", "555").unwrap();

        let reloaded = StateStore::load(&path);
        assert_eq!(reloaded.last_post_id("alice"), Some("100"));
        assert_eq!(reloaded.last_post_id("bob"), Some("555"));
    }

    #[test]
    fn test_written_file_is_current_schema() {
        let dir = TempDir::new().unwrap();
        let path = state_path(&dir);

        let mut store = StateStore::load(&path);
        store.record_published("alice", "100").unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw.get("accounts").is_some());
        assert!(raw["accounts"]["alice"]["last_post_id"].is_string());
        assert!(raw.get("last_updated").is_some());
    }
}

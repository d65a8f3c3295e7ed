//! Installation preferences: the installation id and notification opt-out.
//!
//! Storage location: `~/.stepscout/state.json`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use stepscout_core::Preferences;
use stepscout_core::error::StoreError;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

fn default_true() -> bool {
    true
}

/// The on-disk shape of `state.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub installation_id: Option<String>,

    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            installation_id: None,
            notifications_enabled: true,
        }
    }
}

/// Preferences persisted as a single JSON document, rewritten on change.
pub struct FilePreferences {
    path: PathBuf,
    state: RwLock<PersistedState>,
}

impl FilePreferences {
    pub fn new(path: PathBuf) -> Self {
        let state = Self::load_from_disk(&path);
        Self {
            path,
            state: RwLock::new(state),
        }
    }

    /// Default path: `~/.stepscout/state.json`
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".stepscout").join("state.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(path: &Path) -> PersistedState {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return PersistedState::default(),
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable state file");
            PersistedState::default()
        })
    }

    fn flush(&self, state: &PersistedState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Storage(format!("Failed to create state directory: {e}"))
            })?;
        }
        let content = serde_json::to_string_pretty(state)
            .map_err(|e| StoreError::Serialization(format!("Failed to encode state: {e}")))?;
        std::fs::write(&self.path, content)
            .map_err(|e| StoreError::Storage(format!("Failed to write state file: {e}")))
    }
}

#[async_trait]
impl Preferences for FilePreferences {
    async fn installation_id(&self) -> Result<String, StoreError> {
        if let Some(id) = &self.state.read().await.installation_id {
            return Ok(id.clone());
        }

        let mut state = self.state.write().await;
        // Another caller may have generated it while we waited.
        if let Some(id) = &state.installation_id {
            return Ok(id.clone());
        }
        let id = Uuid::new_v4().to_string();
        state.installation_id = Some(id.clone());
        self.flush(&state)?;
        info!(installation_id = %id, "Generated installation id");
        Ok(id)
    }

    async fn notifications_enabled(&self) -> Result<bool, StoreError> {
        Ok(self.state.read().await.notifications_enabled)
    }

    async fn set_notifications_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.notifications_enabled = enabled;
        self.flush(&state)
    }
}

/// Preferences that live only as long as the process.
#[derive(Default)]
pub struct InMemoryPreferences {
    state: RwLock<PersistedState>,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notifications(enabled: bool) -> Self {
        Self {
            state: RwLock::new(PersistedState {
                installation_id: None,
                notifications_enabled: enabled,
            }),
        }
    }
}

#[async_trait]
impl Preferences for InMemoryPreferences {
    async fn installation_id(&self) -> Result<String, StoreError> {
        let mut state = self.state.write().await;
        Ok(state
            .installation_id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone())
    }

    async fn notifications_enabled(&self) -> Result<bool, StoreError> {
        Ok(self.state.read().await.notifications_enabled)
    }

    async fn set_notifications_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.state.write().await.notifications_enabled = enabled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn temp_path() -> PathBuf {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_path_buf();
        drop(tmp);
        path
    }

    #[tokio::test]
    async fn installation_id_is_stable_across_reloads() {
        let path = temp_path();
        let prefs = FilePreferences::new(path.clone());
        let first = prefs.installation_id().await.unwrap();
        assert_eq!(prefs.installation_id().await.unwrap(), first);
        assert!(Uuid::parse_str(&first).is_ok());

        let reloaded = FilePreferences::new(path);
        assert_eq!(reloaded.installation_id().await.unwrap(), first);
    }

    #[tokio::test]
    async fn notifications_default_on_and_persist_opt_out() {
        let path = temp_path();
        let prefs = FilePreferences::new(path.clone());
        assert!(prefs.notifications_enabled().await.unwrap());

        prefs.set_notifications_enabled(false).await.unwrap();
        let reloaded = FilePreferences::new(path);
        assert!(!reloaded.notifications_enabled().await.unwrap());
    }

    #[tokio::test]
    async fn partial_state_file_uses_defaults() {
        let path = temp_path();
        std::fs::write(&path, r#"{"installation_id": "abc"}"#).unwrap();
        let prefs = FilePreferences::new(path);
        assert_eq!(prefs.installation_id().await.unwrap(), "abc");
        assert!(prefs.notifications_enabled().await.unwrap());
    }

    #[tokio::test]
    async fn corrupt_state_file_starts_fresh() {
        let path = temp_path();
        std::fs::write(&path, "not json").unwrap();
        let prefs = FilePreferences::new(path);
        assert!(prefs.notifications_enabled().await.unwrap());
    }

    #[tokio::test]
    async fn in_memory_preferences() {
        let prefs = InMemoryPreferences::with_notifications(false);
        assert!(!prefs.notifications_enabled().await.unwrap());
        prefs.set_notifications_enabled(true).await.unwrap();
        assert!(prefs.notifications_enabled().await.unwrap());

        let id = prefs.installation_id().await.unwrap();
        assert_eq!(prefs.installation_id().await.unwrap(), id);
    }
}

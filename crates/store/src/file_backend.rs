//! File-based verdict cache: persistent JSON-lines storage.
//!
//! Each line is a JSON-encoded `PageVerdict`. Storage location:
//! `~/.stepscout/cache/verdicts.jsonl`

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stepscout_core::error::StoreError;
use stepscout_core::{PageVerdict, VerdictStore};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A file-backed verdict cache using JSONL (one verdict per line).
///
/// Verdicts are loaded into memory on creation and flushed to disk on every
/// mutation (store, remove, clear).
pub struct FileVerdictStore {
    path: PathBuf,
    verdicts: Arc<RwLock<Vec<PageVerdict>>>,
}

impl FileVerdictStore {
    /// Open the cache at `path`. A missing file starts empty and is created
    /// on first write.
    pub fn new(path: PathBuf) -> Self {
        let verdicts = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = verdicts.len(), "Verdict cache loaded");
        Self {
            path,
            verdicts: Arc::new(RwLock::new(verdicts)),
        }
    }

    /// Default path: `~/.stepscout/cache/verdicts.jsonl`
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
            .join(".stepscout")
            .join("cache")
            .join("verdicts.jsonl")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(path: &Path) -> Vec<PageVerdict> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };

        let mut verdicts: Vec<PageVerdict> = Vec::new();
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            match serde_json::from_str::<PageVerdict>(line) {
                // A later line for the same URL wins.
                Ok(verdict) => upsert(&mut verdicts, verdict),
                Err(e) => warn!(error = %e, "Skipping corrupted verdict entry"),
            }
        }
        verdicts
    }

    /// Flush all verdicts to disk as JSONL.
    async fn flush(&self) -> Result<(), StoreError> {
        let verdicts = self.verdicts.read().await;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Storage(format!("Failed to create cache directory: {e}"))
            })?;
        }

        let mut content = String::new();
        for verdict in verdicts.iter() {
            let line = serde_json::to_string(verdict)
                .map_err(|e| StoreError::Serialization(format!("Failed to encode verdict: {e}")))?;
            content.push_str(&line);
            content.push('\n');
        }

        std::fs::write(&self.path, &content)
            .map_err(|e| StoreError::Storage(format!("Failed to write verdict cache: {e}")))?;

        Ok(())
    }
}

pub(crate) fn upsert(verdicts: &mut Vec<PageVerdict>, verdict: PageVerdict) {
    match verdicts.iter_mut().find(|v| v.url == verdict.url) {
        Some(existing) => *existing = verdict,
        None => verdicts.push(verdict),
    }
}

#[async_trait]
impl VerdictStore for FileVerdictStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, url: &str) -> Result<Option<PageVerdict>, StoreError> {
        let verdicts = self.verdicts.read().await;
        Ok(verdicts.iter().find(|v| v.url == url).cloned())
    }

    async fn store(&self, verdict: PageVerdict) -> Result<(), StoreError> {
        debug!(url = %verdict.url, tier = ?verdict.tier, "Caching verdict");
        upsert(&mut *self.verdicts.write().await, verdict);
        self.flush().await
    }

    async fn remove(&self, url: &str) -> Result<bool, StoreError> {
        let mut verdicts = self.verdicts.write().await;
        let len_before = verdicts.len();
        verdicts.retain(|v| v.url != url);
        let removed = verdicts.len() < len_before;
        drop(verdicts);
        if removed {
            self.flush().await?;
        }
        Ok(removed)
    }

    async fn list(&self) -> Result<Vec<PageVerdict>, StoreError> {
        Ok(self.verdicts.read().await.clone())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.verdicts.read().await.len())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.verdicts.write().await.clear();
        self.flush().await
    }
}

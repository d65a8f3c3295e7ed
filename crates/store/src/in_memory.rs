//! In-memory verdict cache: useful for testing and ephemeral sessions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use stepscout_core::error::StoreError;
use stepscout_core::{PageVerdict, VerdictStore};
use tokio::sync::RwLock;

pub struct InMemoryVerdictStore {
    verdicts: Arc<RwLock<HashMap<String, PageVerdict>>>,
}

impl InMemoryVerdictStore {
    pub fn new() -> Self {
        Self {
            verdicts: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryVerdictStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VerdictStore for InMemoryVerdictStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn get(&self, url: &str) -> Result<Option<PageVerdict>, StoreError> {
        Ok(self.verdicts.read().await.get(url).cloned())
    }

    async fn store(&self, verdict: PageVerdict) -> Result<(), StoreError> {
        self.verdicts.write().await.insert(verdict.url.clone(), verdict);
        Ok(())
    }

    async fn remove(&self, url: &str) -> Result<bool, StoreError> {
        Ok(self.verdicts.write().await.remove(url).is_some())
    }

    async fn list(&self) -> Result<Vec<PageVerdict>, StoreError> {
        let mut verdicts: Vec<PageVerdict> = self.verdicts.read().await.values().cloned().collect();
        verdicts.sort_by(|a, b| a.analyzed_at.cmp(&b.analyzed_at));
        Ok(verdicts)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.verdicts.read().await.len())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.verdicts.write().await.clear();
        Ok(())
    }
}

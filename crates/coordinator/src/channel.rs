//! Page channels: how the background reaches the page context of a tab.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use stepscout_core::TabId;
use stepscout_core::error::{ChannelError, Error};
use tokio::sync::RwLock;
use tracing::info;

use crate::messages::{ContentRequest, ContentResponse};
use crate::page::PageContext;

/// Delivers a request to the page context of a tab and returns its reply.
#[async_trait]
pub trait PageChannel: Send + Sync {
    async fn send(&self, tab: TabId, request: ContentRequest) -> Result<ContentResponse, Error>;
}

/// Routes requests to in-process page contexts by tab id.
#[derive(Default)]
pub struct LocalPageChannel {
    pages: RwLock<HashMap<TabId, Arc<PageContext>>>,
}

impl LocalPageChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a page context, replacing any previous one for the same tab.
    pub async fn register(&self, page: Arc<PageContext>) {
        let tab = page.tab();
        info!(tab, "Registered page context");
        self.pages.write().await.insert(tab, page);
    }

    /// Detach the page context of a closed tab.
    pub async fn unregister(&self, tab: TabId) -> Option<Arc<PageContext>> {
        self.pages.write().await.remove(&tab)
    }

    pub async fn get(&self, tab: TabId) -> Option<Arc<PageContext>> {
        self.pages.read().await.get(&tab).cloned()
    }

    /// All registered tab ids, ascending.
    pub async fn tabs(&self) -> Vec<TabId> {
        let mut tabs: Vec<TabId> = self.pages.read().await.keys().copied().collect();
        tabs.sort_unstable();
        tabs
    }

    pub async fn len(&self) -> usize {
        self.pages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pages.read().await.is_empty()
    }
}

#[async_trait]
impl PageChannel for LocalPageChannel {
    async fn send(&self, tab: TabId, request: ContentRequest) -> Result<ContentResponse, Error> {
        let page = self
            .get(tab)
            .await
            .ok_or(ChannelError::UnknownTab(tab))?;
        page.handle(request).await
    }
}

//! Persisted state traits: the verdict cache and user preferences.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::verdict::PageVerdict;

/// A cache of page verdicts keyed by the page's full URL.
///
/// Keys are not normalized: two URLs that differ only by query string are
/// distinct entries. Writes are last-writer-wins.
#[async_trait]
pub trait VerdictStore: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Look up the verdict for a URL.
    async fn get(&self, url: &str) -> Result<Option<PageVerdict>, StoreError>;

    /// Store a verdict, replacing any previous entry for the same URL.
    async fn store(&self, verdict: PageVerdict) -> Result<(), StoreError>;

    /// Remove the entry for a URL. Returns whether one existed.
    async fn remove(&self, url: &str) -> Result<bool, StoreError>;

    /// All stored verdicts.
    async fn list(&self) -> Result<Vec<PageVerdict>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;
}

/// Per-installation settings.
#[async_trait]
pub trait Preferences: Send + Sync {
    /// The random identifier of this installation, generated on first use
    /// and stable afterwards.
    async fn installation_id(&self) -> Result<String, StoreError>;

    /// Whether strong verdicts may raise a notification. Defaults to `true`.
    async fn notifications_enabled(&self) -> Result<bool, StoreError>;

    async fn set_notifications_enabled(&self, enabled: bool) -> Result<(), StoreError>;
}

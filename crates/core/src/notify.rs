//! Notifier trait: transient user-facing notifications.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::NotifyError;

/// A notification offering to open the panel for a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    /// Page that triggered it.
    pub url: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn show(&self, notification: &Notification) -> Result<(), NotifyError>;

    async fn clear(&self, id: &str) -> Result<(), NotifyError>;
}

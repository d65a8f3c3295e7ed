//! Notifier implementations.

use async_trait::async_trait;
use stepscout_core::error::NotifyError;
use stepscout_core::{Notification, Notifier};
use tracing::info;

/// Presents notifications as log lines.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn show(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            id = %notification.id,
            url = %notification.url,
            "{}: {}",
            notification.title,
            notification.message
        );
        Ok(())
    }

    async fn clear(&self, id: &str) -> Result<(), NotifyError> {
        info!(id, "Notification dismissed");
        Ok(())
    }
}

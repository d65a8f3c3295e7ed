//! Domain event system: decoupled observation of the analysis pipeline.
//!
//! The coordinator and page contexts publish events as analyses complete;
//! the CLI and tests subscribe without coupling to either side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::verdict::Tier;

/// Identifier of a browser tab hosting one page context.
pub type TabId = u32;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A page finished scoring and its verdict was cached
    AnalysisCompleted {
        url: String,
        tier: Tier,
        matched: usize,
        total: usize,
        timestamp: DateTime<Utc>,
    },

    /// A page was skipped without producing a verdict
    PageSkipped {
        url: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// A notification was presented for a strong page
    NotificationShown {
        tab: TabId,
        url: String,
        timestamp: DateTime<Utc>,
    },

    /// A remote enrichment call finished (successfully or not)
    EnrichmentFinished {
        url: String,
        outcome: String,
        timestamp: DateTime<Utc>,
    },

    /// An error occurred
    ErrorOccurred {
        context: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(DomainEvent::AnalysisCompleted {
            url: "https://example.com/recipe".into(),
            tier: Tier::Strong,
            matched: 12,
            total: 30,
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            DomainEvent::AnalysisCompleted { url, tier, .. } => {
                assert_eq!(url, "https://example.com/recipe");
                assert_eq!(*tier, Tier::Strong);
            }
            _ => panic!("Expected AnalysisCompleted event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(DomainEvent::ErrorOccurred {
            context: "test".into(),
            error_message: "no subscribers".into(),
            timestamp: Utc::now(),
        });
    }
}

//! Background coordinator: reacts to browser events and page reports.
//!
//! ```text
//! PageLoaded ──► extractInstructions{silent} ──► page context
//!                                                   │
//!   Message(instructionAnalysisResult{strong}) ◄────┘
//!        │
//!        └──► notification ──click──► triggerRemoteExtraction
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use stepscout_config::NotificationConfig;
use stepscout_core::error::Error;
use stepscout_core::{DomainEvent, EventBus, Notification, Notifier, Preferences, TabId, Tier};
use tokio::sync::{Mutex, RwLock, mpsc};
use tracing::{debug, info, warn};

use crate::channel::PageChannel;
use crate::gate::InFlightGate;
use crate::messages::{BackgroundMessage, ContentRequest, ContentResponse, Envelope};

/// Id of the single notification the coordinator ever shows.
pub const NOTIFICATION_ID: &str = "instruction-notification";

/// Inputs to the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorEvent {
    /// A tab finished loading a page.
    PageLoaded { tab: TabId, url: String },
    /// The toolbar action was clicked while `tab` was active.
    ActionClicked { tab: TabId },
    /// A page context reported back.
    Message(Envelope),
    NotificationClicked { id: String },
    TabClosed { tab: TabId },
}

/// Per-tab analysis state, as seen from the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabState {
    Idle,
    Scanning,
    Scored(Tier),
    Failed,
}

/// How notifications look and how long they stay up.
#[derive(Debug, Clone)]
pub struct NotificationSettings {
    pub title: String,
    pub message: String,
    pub dismiss_after: Duration,
}

impl From<&NotificationConfig> for NotificationSettings {
    fn from(config: &NotificationConfig) -> Self {
        Self {
            title: config.title.clone(),
            message: config.message.clone(),
            dismiss_after: Duration::from_secs(config.dismiss_after_secs),
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self::from(&NotificationConfig::default())
    }
}

pub struct Coordinator {
    channel: Arc<dyn PageChannel>,
    notifier: Arc<dyn Notifier>,
    preferences: Arc<dyn Preferences>,
    events: Arc<EventBus>,
    settings: NotificationSettings,
    tabs: RwLock<HashMap<TabId, TabState>>,
    urls: RwLock<HashMap<TabId, String>>,
    notification_gate: InFlightGate,
    notified_tab: Mutex<Option<TabId>>,
}

impl Coordinator {
    pub fn new(
        channel: Arc<dyn PageChannel>,
        notifier: Arc<dyn Notifier>,
        preferences: Arc<dyn Preferences>,
        events: Arc<EventBus>,
        settings: NotificationSettings,
    ) -> Self {
        Self {
            channel,
            notifier,
            preferences,
            events,
            settings,
            tabs: RwLock::new(HashMap::new()),
            urls: RwLock::new(HashMap::new()),
            notification_gate: InFlightGate::new(),
            notified_tab: Mutex::new(None),
        }
    }

    pub async fn state(&self, tab: TabId) -> TabState {
        self.tabs
            .read()
            .await
            .get(&tab)
            .copied()
            .unwrap_or(TabState::Idle)
    }

    async fn transition(&self, tab: TabId, next: TabState) {
        let previous = self
            .tabs
            .write()
            .await
            .insert(tab, next)
            .unwrap_or(TabState::Idle);
        if previous != next {
            debug!(tab, from = ?previous, to = ?next, "Tab state changed");
        }
    }

    /// Handle one event. Returns the page's reply when a request was sent.
    pub async fn handle(&self, event: CoordinatorEvent) -> Result<Option<ContentResponse>, Error> {
        match event {
            CoordinatorEvent::PageLoaded { tab, url } => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    debug!(tab, url = %url, "Ignoring non-web page");
                    return Ok(None);
                }
                self.urls.write().await.insert(tab, url);
                self.scan_tab(tab).await.map(Some)
            }
            CoordinatorEvent::ActionClicked { tab } => self
                .channel
                .send(tab, ContentRequest::ToggleFloatingUi)
                .await
                .map(Some),
            CoordinatorEvent::Message(envelope) => {
                self.on_message(envelope).await?;
                Ok(None)
            }
            CoordinatorEvent::NotificationClicked { id } => self.on_notification_clicked(&id).await,
            CoordinatorEvent::TabClosed { tab } => {
                self.tabs.write().await.remove(&tab);
                self.urls.write().await.remove(&tab);
                Ok(None)
            }
        }
    }

    /// Run a silent analysis of `tab`, tracking its state.
    pub async fn scan_tab(&self, tab: TabId) -> Result<ContentResponse, Error> {
        self.transition(tab, TabState::Scanning).await;

        let result = self
            .channel
            .send(tab, ContentRequest::ExtractInstructions { visible: false })
            .await;

        let next = match &result {
            Ok(ContentResponse::Analyzed(analysis)) => TabState::Scored(analysis.verdict.tier),
            Ok(ContentResponse::Coalesced) => TabState::Scanning,
            Ok(_) => TabState::Idle,
            Err(e) => {
                warn!(tab, error = %e, "Tab analysis failed");
                TabState::Failed
            }
        };
        self.transition(tab, next).await;
        result
    }

    async fn on_message(&self, envelope: Envelope) -> Result<(), Error> {
        match envelope.message {
            BackgroundMessage::InstructionAnalysisResult { tier } => {
                debug!(tab = envelope.tab, tier = ?tier, "Analysis result received");
                if tier == Tier::Strong {
                    self.notify(envelope.tab).await?;
                }
            }
        }
        Ok(())
    }

    /// Present the notification for `tab` unless the user opted out or one
    /// is already being presented. Returns whether it was shown.
    pub async fn notify(&self, tab: TabId) -> Result<bool, Error> {
        if !self.preferences.notifications_enabled().await? {
            debug!(tab, "Notifications disabled, not notifying");
            return Ok(false);
        }

        let Some(_presenting) = self.notification_gate.try_enter() else {
            debug!(tab, "Notification already being presented");
            return Ok(false);
        };

        let url = self.urls.read().await.get(&tab).cloned().unwrap_or_default();
        let notification = Notification {
            id: NOTIFICATION_ID.to_string(),
            title: self.settings.title.clone(),
            message: self.settings.message.clone(),
            url: url.clone(),
        };

        self.notifier.show(&notification).await?;
        *self.notified_tab.lock().await = Some(tab);
        info!(tab, url = %url, "Notification shown");
        self.events.publish(DomainEvent::NotificationShown {
            tab,
            url,
            timestamp: Utc::now(),
        });

        let notifier = self.notifier.clone();
        let dismiss_after = self.settings.dismiss_after;
        tokio::spawn(async move {
            tokio::time::sleep(dismiss_after).await;
            if let Err(e) = notifier.clear(NOTIFICATION_ID).await {
                warn!(error = %e, "Failed to dismiss notification");
            }
        });

        Ok(true)
    }

    async fn on_notification_clicked(&self, id: &str) -> Result<Option<ContentResponse>, Error> {
        if id != NOTIFICATION_ID {
            debug!(id, "Ignoring click on foreign notification");
            return Ok(None);
        }

        let tab = self.notified_tab.lock().await.take();
        let response = match tab {
            Some(tab) => {
                info!(tab, "Notification clicked, requesting remote extraction");
                Some(
                    self.channel
                        .send(tab, ContentRequest::TriggerRemoteExtraction)
                        .await?,
                )
            }
            None => None,
        };

        self.notifier.clear(id).await?;
        Ok(response)
    }

    /// Process events until every sender is dropped.
    pub async fn run(&self, mut events: mpsc::Receiver<CoordinatorEvent>) {
        info!("Coordinator started");
        while let Some(event) = events.recv().await {
            if let Err(e) = self.handle(event).await {
                warn!(error = %e, "Coordinator event failed");
                self.events.publish(DomainEvent::ErrorOccurred {
                    context: "coordinator".into(),
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
            }
        }
        info!("Coordinator stopped");
    }
}

/// Feed page-context reports into the coordinator's event stream.
pub fn forward_outbox(
    mut outbox: mpsc::UnboundedReceiver<Envelope>,
    events: mpsc::Sender<CoordinatorEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(envelope) = outbox.recv().await {
            if events.send(CoordinatorEvent::Message(envelope)).await.is_err() {
                break;
            }
        }
    })
}

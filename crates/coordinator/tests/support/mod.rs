//! Shared fixtures for the coordinator tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use stepscout_coordinator::{Envelope, PageContext, PageServices};
use stepscout_core::error::{ModelError, NotifyError, RemoteError, StoreError};
use stepscout_core::{EventBus, Notification, Notifier, Preferences, SentenceModel, TokenSequence};
use stepscout_model::{InferenceEngine, LoadedModel, ModelLoader, Vocabulary};
use stepscout_remote::{Enricher, EnrichmentOutcome};
use stepscout_scoring::{BlockScorer, PageDocument, SkipRules};
use stepscout_store::{InMemoryPreferences, InMemoryVerdictStore};
use tokio::sync::{Mutex, mpsc};

pub const TAB: u32 = 1;
pub const RECIPE_URL: &str = "https://cooking.example.com/risotto";

const STIR_ID: i64 = 7;

/// 0.9 for sentences containing "stir", 0 otherwise.
pub struct KeywordModel {
    pub calls: Arc<AtomicUsize>,
    pub delay: Duration,
}

#[async_trait]
impl SentenceModel for KeywordModel {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn forward(&self, input: &TokenSequence) -> Result<Option<f32>, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let hit = input.ids().iter().any(|&id| i64::from(id) == STIR_ID);
        Ok(Some(if hit { 0.9 } else { 0.0 }))
    }
}

/// Loads a [`KeywordModel`], or fails, counting attempts.
pub struct TestLoader {
    pub loads: AtomicUsize,
    pub model_calls: Arc<AtomicUsize>,
    pub fail: bool,
    pub delay: Duration,
}

#[async_trait]
impl ModelLoader for TestLoader {
    async fn load(&self) -> Result<LoadedModel, ModelError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ModelError::LoadFailed("model.onnx is corrupt".into()));
        }
        let mut ids = HashMap::new();
        ids.insert("<OOV>".to_string(), 1);
        ids.insert("stir".to_string(), STIR_ID);
        Ok(LoadedModel::new(
            Vocabulary::from_map(ids),
            Box::new(KeywordModel {
                calls: self.model_calls.clone(),
                delay: self.delay,
            }),
        ))
    }
}

/// Returns a fixed outcome for every call.
pub struct StubEnricher {
    pub result: Result<EnrichmentOutcome, RemoteError>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl StubEnricher {
    pub fn new(result: Result<EnrichmentOutcome, RemoteError>) -> Self {
        Self {
            result,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Enricher for StubEnricher {
    async fn extract(
        &self,
        user_id: &str,
        page_text: &str,
    ) -> Result<EnrichmentOutcome, RemoteError> {
        self.calls
            .lock()
            .await
            .push((user_id.to_string(), page_text.to_string()));
        self.result.clone()
    }
}

/// Keeps every notification it is asked to show or clear.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    shown: std::sync::Mutex<Vec<Notification>>,
    cleared: std::sync::Mutex<Vec<String>>,
    show_delay: Duration,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `show` take `delay` before it returns.
    pub fn with_show_delay(delay: Duration) -> Self {
        Self {
            show_delay: delay,
            ..Self::default()
        }
    }

    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().unwrap().clone()
    }

    pub fn cleared(&self) -> Vec<String> {
        self.cleared.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn show(&self, notification: &Notification) -> Result<(), NotifyError> {
        if !self.show_delay.is_zero() {
            tokio::time::sleep(self.show_delay).await;
        }
        self.shown.lock().unwrap().push(notification.clone());
        Ok(())
    }

    async fn clear(&self, id: &str) -> Result<(), NotifyError> {
        self.cleared.lock().unwrap().push(id.to_string());
        Ok(())
    }
}

/// Preferences whose state file cannot be read.
pub struct BrokenPreferences;

#[async_trait]
impl Preferences for BrokenPreferences {
    async fn installation_id(&self) -> Result<String, StoreError> {
        Err(StoreError::Storage("state.json is unreadable".into()))
    }

    async fn notifications_enabled(&self) -> Result<bool, StoreError> {
        Err(StoreError::Storage("state.json is unreadable".into()))
    }

    async fn set_notifications_enabled(&self, _enabled: bool) -> Result<(), StoreError> {
        Err(StoreError::Storage("state.json is unreadable".into()))
    }
}

/// A page with `instructions` matching paragraphs and `filler` others.
pub fn recipe_html(instructions: usize, filler: usize) -> String {
    let mut body = String::from("<main><h1>Creamy mushroom risotto tonight</h1>");
    for i in 0..instructions {
        body.push_str(&format!(
            "<p>Stir the rice gently for about {} minutes on low heat.</p>",
            i + 2
        ));
    }
    for i in 0..filler {
        body.push_str(&format!(
            "<p>My grandmother loved this dish in summer number {i}.</p>"
        ));
    }
    body.push_str("</main>");
    format!("<html><head><title>Risotto</title></head><body>{body}</body></html>")
}

pub struct Harness {
    pub page: Arc<PageContext>,
    pub store: Arc<InMemoryVerdictStore>,
    pub preferences: Arc<dyn Preferences>,
    pub enricher: Arc<StubEnricher>,
    pub loader: Arc<TestLoader>,
    pub engine: Arc<InferenceEngine>,
    pub events: Arc<EventBus>,
    pub outbox: mpsc::UnboundedReceiver<Envelope>,
}

impl Harness {
    pub fn model_calls(&self) -> usize {
        self.loader.model_calls.load(Ordering::SeqCst)
    }

    pub fn loads(&self) -> usize {
        self.loader.loads.load(Ordering::SeqCst)
    }
}

pub struct HarnessBuilder {
    url: String,
    html: String,
    fail_load: bool,
    model_delay: Duration,
    notifications: bool,
    broken_preferences: bool,
    enrichment: Result<EnrichmentOutcome, RemoteError>,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            url: RECIPE_URL.to_string(),
            html: recipe_html(6, 4),
            fail_load: false,
            model_delay: Duration::ZERO,
            notifications: true,
            broken_preferences: false,
            enrichment: Ok(EnrichmentOutcome::Instructions {
                text: "1. Stir\n2. Serve".into(),
            }),
        }
    }
}

impl HarnessBuilder {
    pub fn page(mut self, url: &str, html: String) -> Self {
        self.url = url.to_string();
        self.html = html;
        self
    }

    pub fn failing_model(mut self) -> Self {
        self.fail_load = true;
        self
    }

    pub fn slow_model(mut self, delay: Duration) -> Self {
        self.model_delay = delay;
        self
    }

    pub fn notifications(mut self, enabled: bool) -> Self {
        self.notifications = enabled;
        self
    }

    pub fn broken_preferences(mut self) -> Self {
        self.broken_preferences = true;
        self
    }

    pub fn enrichment(mut self, result: Result<EnrichmentOutcome, RemoteError>) -> Self {
        self.enrichment = result;
        self
    }

    pub fn build(self) -> Harness {
        let loader = Arc::new(TestLoader {
            loads: AtomicUsize::new(0),
            model_calls: Arc::new(AtomicUsize::new(0)),
            fail: self.fail_load,
            delay: self.model_delay,
        });
        let engine = Arc::new(InferenceEngine::new(loader.clone()));
        let store = Arc::new(InMemoryVerdictStore::new());
        let preferences: Arc<dyn Preferences> = if self.broken_preferences {
            Arc::new(BrokenPreferences)
        } else {
            Arc::new(InMemoryPreferences::with_notifications(self.notifications))
        };
        let enricher = Arc::new(StubEnricher::new(self.enrichment));
        let events = Arc::new(EventBus::new(64));
        let skip_rules = SkipRules::from_config(&stepscout_config::ScanConfig::default())
            .expect("default skip patterns compile");

        let services = PageServices {
            scorer: Arc::new(BlockScorer::new(engine.clone())),
            store: store.clone(),
            preferences: preferences.clone(),
            enricher: enricher.clone(),
            skip_rules: Arc::new(skip_rules),
            events: events.clone(),
        };

        let (outbox_tx, outbox) = mpsc::unbounded_channel();
        let document = PageDocument::parse(self.url, &self.html);
        let page = Arc::new(PageContext::new(TAB, document, services, outbox_tx));

        Harness {
            page,
            store,
            preferences,
            enricher,
            loader,
            engine,
            events,
            outbox,
        }
    }
}

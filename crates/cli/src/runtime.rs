//! Wires the crates together the way the extension runs them: one
//! coordinator and one page context per opened source.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use stepscout_config::AppConfig;
use stepscout_coordinator::{
    ContentResponse, Coordinator, CoordinatorEvent, Envelope, LocalPageChannel, LogNotifier,
    NotificationSettings, PageContext, PageServices,
};
use stepscout_core::{EventBus, TabId};
use stepscout_model::{FileModelLoader, InferenceEngine};
use stepscout_remote::EnrichmentClient;
use stepscout_scoring::{BlockScorer, PageDocument, SkipRules};
use stepscout_store::{FilePreferences, FileVerdictStore};
use tokio::sync::mpsc;
use tracing::debug;

/// The CLI drives a single tab.
pub const TAB: TabId = 1;

pub struct Runtime {
    pub config: AppConfig,
    pub coordinator: Coordinator,
    pub channel: Arc<LocalPageChannel>,
    services: PageServices,
    outbox_tx: mpsc::UnboundedSender<Envelope>,
    outbox: mpsc::UnboundedReceiver<Envelope>,
}

impl Runtime {
    pub fn build(config: AppConfig) -> Result<Self, Box<dyn Error>> {
        let loader = FileModelLoader::new(
            config.model.resolved_model_path(),
            config.model.resolved_vocab_path(),
        );
        let engine = Arc::new(InferenceEngine::new(Arc::new(loader)));
        let store = Arc::new(FileVerdictStore::new(config.storage.resolved_cache_path()));
        let preferences = Arc::new(FilePreferences::new(config.storage.resolved_state_path()));
        let enricher = Arc::new(EnrichmentClient::from_config(&config.remote)?);
        let skip_rules = Arc::new(
            SkipRules::from_config(&config.scan)
                .map_err(|e| format!("Invalid skip pattern: {e}"))?,
        );
        let events = Arc::new(EventBus::default());

        let services = PageServices {
            scorer: Arc::new(BlockScorer::new(engine)),
            store,
            preferences: preferences.clone(),
            enricher,
            skip_rules,
            events: events.clone(),
        };

        let channel = Arc::new(LocalPageChannel::new());
        let coordinator = Coordinator::new(
            channel.clone(),
            Arc::new(LogNotifier),
            preferences,
            events,
            NotificationSettings::from(&config.notifications),
        );

        let (outbox_tx, outbox) = mpsc::unbounded_channel();

        Ok(Self {
            config,
            coordinator,
            channel,
            services,
            outbox_tx,
            outbox,
        })
    }

    /// Fetch or read `source` and attach it to [`TAB`]. Returns the page URL.
    pub async fn open_page(&self, source: &str) -> Result<String, Box<dyn Error>> {
        let timeout = Duration::from_secs(self.config.remote.timeout_secs);
        let (url, html) = load_source(source, timeout).await?;
        let document = PageDocument::parse(url.clone(), &html);
        debug!(url = %url, blocks = document.candidate_blocks().len(), "Page parsed");

        let page = PageContext::new(
            TAB,
            document,
            self.services.clone(),
            self.outbox_tx.clone(),
        );
        self.channel.register(Arc::new(page)).await;
        Ok(url)
    }

    /// URL of the page attached to [`TAB`], after any redirects.
    pub async fn page_url(&self) -> Option<String> {
        match self.channel.get(TAB).await {
            Some(page) => Some(page.url().await),
            None => None,
        }
    }

    /// Silently analyze the open page the way a finished page load does.
    pub async fn scan(&mut self) -> Result<ContentResponse, Box<dyn Error>> {
        let url = self.page_url().await.ok_or("no page is open")?;
        let response = if is_web_url(&url) {
            self.coordinator
                .handle(CoordinatorEvent::PageLoaded { tab: TAB, url })
                .await?
                .ok_or("page load produced no response")?
        } else {
            self.coordinator.scan_tab(TAB).await?
        };

        self.deliver_reports().await?;
        Ok(response)
    }

    /// Hand pending page reports to the coordinator.
    pub async fn deliver_reports(&mut self) -> Result<(), Box<dyn Error>> {
        while let Ok(envelope) = self.outbox.try_recv() {
            self.coordinator
                .handle(CoordinatorEvent::Message(envelope))
                .await?;
        }
        Ok(())
    }
}

fn is_web_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Load the HTML of `source`: fetched when it is an http(s) URL, read from
/// disk otherwise. Files get a `file://` URL.
pub async fn load_source(
    source: &str,
    timeout: Duration,
) -> Result<(String, String), Box<dyn Error>> {
    if is_web_url(source) {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let response = client.get(source).send().await?.error_for_status()?;
        let url = response.url().to_string();
        let html = response.text().await?;
        return Ok((url, html));
    }

    let path = Path::new(source);
    let html = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let absolute = tokio::fs::canonicalize(path).await?;
    Ok((format!("file://{}", absolute.display()), html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_source_gets_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<html><body><p>Hello</p></body></html>").unwrap();

        let (url, html) = load_source(path.to_str().unwrap(), Duration::from_secs(1))
            .await
            .unwrap();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("page.html"));
        assert!(html.contains("<p>Hello</p>"));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.html");
        let err = load_source(path.to_str().unwrap(), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn web_urls() {
        assert!(is_web_url("https://example.com"));
        assert!(is_web_url("http://example.com"));
        assert!(!is_web_url("./page.html"));
        assert!(!is_web_url("file:///tmp/page.html"));
    }

    fn runtime_in(dir: &Path) -> Runtime {
        let mut config = AppConfig::default();
        config.storage.cache_path = Some(dir.join("verdicts.jsonl").display().to_string());
        config.storage.state_path = Some(dir.join("state.json").display().to_string());
        Runtime::build(config).unwrap()
    }

    #[tokio::test]
    async fn redirected_page_keeps_final_url() {
        use axum::Router;
        use axum::response::{Html, Redirect};
        use axum::routing::get;

        let router = Router::new()
            .route("/old", get(|| async { Redirect::permanent("/new") }))
            .route(
                "/new",
                get(|| async { Html("<html><body><p>Moved here</p></body></html>") }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let dir = tempfile::tempdir().unwrap();
        let runtime = runtime_in(dir.path());
        let url = runtime
            .open_page(&format!("http://{addr}/old"))
            .await
            .unwrap();

        assert_eq!(url, format!("http://{addr}/new"));
        assert_eq!(runtime.page_url().await, Some(url));
    }

    #[tokio::test]
    async fn scan_without_page_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut runtime = runtime_in(dir.path());
        assert!(runtime.page_url().await.is_none());
        let err = runtime.scan().await.unwrap_err();
        assert!(err.to_string().contains("no page is open"));
    }

    #[tokio::test]
    async fn build_from_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.storage.cache_path = Some(dir.path().join("verdicts.jsonl").display().to_string());
        config.storage.state_path = Some(dir.path().join("state.json").display().to_string());

        let runtime = Runtime::build(config).unwrap();
        assert!(runtime.channel.is_empty().await);
    }
}

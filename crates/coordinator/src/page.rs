//! Page context: the per-tab side of the extension.
//!
//! A `PageContext` owns the parsed document of one tab and answers every
//! [`ContentRequest`] for it. It reports silent analysis results back to the
//! background through its outbox. The outbox is unbounded: the background
//! may be waiting on this very page while its reports are queued.

use std::sync::Arc;

use chrono::Utc;
use stepscout_core::error::{Error, ModelError};
use stepscout_core::{DomainEvent, EventBus, Preferences, TabId, Tier, VerdictStore};
use stepscout_remote::Enricher;
use stepscout_scoring::{BlockScorer, PageDocument, SkipRules, aggregate};
use tokio::sync::{Mutex, RwLock, mpsc};
use tracing::{debug, info, warn};

use crate::gate::InFlightGate;
use crate::messages::{BackgroundMessage, ContentRequest, ContentResponse, Envelope};
use crate::panel::{EnrichmentView, PanelReport, PanelState, PanelView};

/// Everything a page context needs that is shared across tabs.
#[derive(Clone)]
pub struct PageServices {
    pub scorer: Arc<BlockScorer>,
    pub store: Arc<dyn VerdictStore>,
    pub preferences: Arc<dyn Preferences>,
    pub enricher: Arc<dyn Enricher>,
    pub skip_rules: Arc<SkipRules>,
    pub events: Arc<EventBus>,
}

pub struct PageContext {
    tab: TabId,
    document: RwLock<Arc<PageDocument>>,
    services: PageServices,
    panel: Mutex<Option<PanelState>>,
    analysis_gate: InFlightGate,
    outbox: mpsc::UnboundedSender<Envelope>,
}

impl PageContext {
    pub fn new(
        tab: TabId,
        document: PageDocument,
        services: PageServices,
        outbox: mpsc::UnboundedSender<Envelope>,
    ) -> Self {
        Self {
            tab,
            document: RwLock::new(Arc::new(document)),
            services,
            panel: Mutex::new(None),
            analysis_gate: InFlightGate::new(),
            outbox,
        }
    }

    pub fn tab(&self) -> TabId {
        self.tab
    }

    pub async fn document(&self) -> Arc<PageDocument> {
        self.document.read().await.clone()
    }

    pub async fn url(&self) -> String {
        self.document.read().await.url().to_string()
    }

    /// Replace the document after an in-tab navigation.
    pub async fn navigate(&self, document: PageDocument) {
        info!(tab = self.tab, url = %document.url(), "Page navigated");
        *self.document.write().await = Arc::new(document);
    }

    /// The panel as last rendered, if it was ever opened.
    pub async fn panel(&self) -> Option<PanelState> {
        self.panel.lock().await.clone()
    }

    pub fn is_analyzing(&self) -> bool {
        self.analysis_gate.is_busy()
    }

    /// Answer one request from the background.
    pub async fn handle(&self, request: ContentRequest) -> Result<ContentResponse, Error> {
        debug!(tab = self.tab, request = ?request, "Handling page request");
        match request {
            ContentRequest::ExtractInstructions { visible } => self.extract(visible).await,
            ContentRequest::GetPageText => {
                let document = self.document().await;
                Ok(ContentResponse::PageText(document.page_text().to_string()))
            }
            ContentRequest::ToggleFloatingUi => self.toggle_panel().await,
            ContentRequest::TriggerRemoteExtraction => self.trigger_remote().await,
        }
    }

    async fn extract(&self, visible: bool) -> Result<ContentResponse, Error> {
        let document = self.document().await;
        let url = document.url().to_string();

        if let Some(reason) = self.services.skip_rules.check(&document) {
            info!(tab = self.tab, url = %url, reason = %reason, "Skipping page");
            self.services.events.publish(DomainEvent::PageSkipped {
                url,
                reason: reason.to_string(),
                timestamp: Utc::now(),
            });
            return Ok(ContentResponse::Skipped(reason));
        }

        let Some(_analysis) = self.analysis_gate.try_enter() else {
            debug!(tab = self.tab, url = %url, "Analysis already in flight, coalescing");
            return Ok(ContentResponse::Coalesced);
        };

        if visible {
            self.open_panel(&document).await;
            self.set_view(PanelView::Loading).await;
        }

        let scores = match self.services.scorer.score_page(&document).await {
            Ok(scores) => scores,
            Err(e) => return self.analysis_failed(&url, e, visible).await,
        };

        let analysis = aggregate(&url, &scores);
        self.services.store.store(analysis.verdict.clone()).await?;

        info!(
            tab = self.tab,
            url = %url,
            tier = ?analysis.verdict.tier,
            matched = analysis.verdict.matched_count,
            total = analysis.verdict.total_count,
            "Page analyzed"
        );
        self.services.events.publish(DomainEvent::AnalysisCompleted {
            url,
            tier: analysis.verdict.tier,
            matched: analysis.verdict.matched_count,
            total: analysis.verdict.total_count,
            timestamp: Utc::now(),
        });

        if visible {
            let panel = self
                .set_view(PanelView::Report(PanelReport::from_analysis(&analysis)))
                .await;
            return Ok(ContentResponse::Panel(panel));
        }

        self.report_tier(analysis.verdict.tier);
        Ok(ContentResponse::Analyzed(analysis))
    }

    async fn analysis_failed(
        &self,
        url: &str,
        error: ModelError,
        visible: bool,
    ) -> Result<ContentResponse, Error> {
        warn!(tab = self.tab, url = %url, error = %error, "Page analysis failed");
        self.services.events.publish(DomainEvent::ErrorOccurred {
            context: format!("analysis of {url}"),
            error_message: error.to_string(),
            timestamp: Utc::now(),
        });

        if visible {
            let panel = self
                .set_view(PanelView::Error(format!("Error during model run: {error}")))
                .await;
            return Ok(ContentResponse::Panel(panel));
        }
        Err(error.into())
    }

    fn report_tier(&self, tier: Tier) {
        let envelope = Envelope {
            tab: self.tab,
            message: BackgroundMessage::InstructionAnalysisResult { tier },
        };
        if self.outbox.send(envelope).is_err() {
            warn!(tab = self.tab, "Background is gone, dropping analysis result");
        }
    }

    async fn toggle_panel(&self) -> Result<ContentResponse, Error> {
        let document = self.document().await;
        self.open_panel(&document).await;

        if let Some(verdict) = self.services.store.get(document.url()).await? {
            debug!(tab = self.tab, url = %verdict.url, "Showing cached verdict");
            let panel = self
                .set_view(PanelView::Report(PanelReport::from_cached(&verdict)))
                .await;
            return Ok(ContentResponse::Panel(panel));
        }

        match self.extract(true).await? {
            ContentResponse::Skipped(reason) => {
                let panel = self
                    .set_view(PanelView::Error(format!(
                        "This page was not analyzed ({reason})."
                    )))
                    .await;
                Ok(ContentResponse::Panel(panel))
            }
            ContentResponse::Coalesced => {
                Ok(ContentResponse::Panel(self.current_panel(&document).await))
            }
            response => Ok(response),
        }
    }

    async fn trigger_remote(&self) -> Result<ContentResponse, Error> {
        let document = self.document().await;
        self.open_panel(&document).await;
        self.set_view(PanelView::Loading).await;

        let (view, outcome) = self.remote_view(&document).await;
        self.services.events.publish(DomainEvent::EnrichmentFinished {
            url: document.url().to_string(),
            outcome,
            timestamp: Utc::now(),
        });

        Ok(ContentResponse::Panel(self.set_view(view).await))
    }

    /// Ask the enricher for the page's instructions. Every failure becomes an
    /// error view.
    async fn remote_view(&self, document: &PageDocument) -> (PanelView, String) {
        let user_id = match self.services.preferences.installation_id().await {
            Ok(id) => id,
            Err(e) => {
                warn!(tab = self.tab, error = %e, "Installation id unavailable");
                return (
                    PanelView::Error(format!("Remote extraction failed: {e}")),
                    "error".to_string(),
                );
            }
        };

        let text = document.enrichment_text();
        info!(
            tab = self.tab,
            url = %document.url(),
            chars = text.len(),
            "Requesting remote extraction"
        );

        match self.services.enricher.extract(&user_id, &text).await {
            Ok(outcome) => {
                let label = outcome.label().to_string();
                (PanelView::Enrichment(EnrichmentView::from(outcome)), label)
            }
            Err(e) => {
                warn!(tab = self.tab, error = %e, "Remote extraction failed");
                (
                    PanelView::Error(format!("Remote extraction failed: {e}")),
                    "error".to_string(),
                )
            }
        }
    }

    /// Open the panel for `document`, keeping it if it already shows that URL.
    async fn open_panel(&self, document: &PageDocument) {
        let mut panel = self.panel.lock().await;
        let reusable = panel.as_ref().is_some_and(|p| p.url == document.url());
        if !reusable {
            *panel = Some(PanelState::new(document.url(), document.title()));
        }
    }

    async fn current_panel(&self, document: &PageDocument) -> PanelState {
        self.panel
            .lock()
            .await
            .get_or_insert_with(|| PanelState::new(document.url(), document.title()))
            .clone()
    }

    async fn set_view(&self, view: PanelView) -> PanelState {
        let mut guard = self.panel.lock().await;
        let document = self.document.read().await;
        let panel =
            guard.get_or_insert_with(|| PanelState::new(document.url(), document.title()));
        panel.view = view;
        panel.clone()
    }
}

//! Panel render model: what the floating panel shows, as plain data.

use serde::{Deserialize, Serialize};
use stepscout_core::{BlockScore, PageAnalysis, PageVerdict, Tier};
use stepscout_remote::EnrichmentOutcome;

/// Shown in place of a block list when nothing matched.
pub const NO_MATCHES_MESSAGE: &str = "No instruction-like content found on this page.";

/// Shown when the remote endpoint answered with nothing.
pub const EMPTY_ENRICHMENT_MESSAGE: &str = "No instructions could be extracted from this page.";

/// The panel attached to one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelState {
    pub url: String,
    pub title: String,
    pub view: PanelView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", content = "data", rename_all = "snake_case")]
pub enum PanelView {
    Loading,
    Report(PanelReport),
    Error(String),
    Enrichment(EnrichmentView),
}

/// A local-model verdict, ready to display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelReport {
    pub tier: Tier,
    pub header: String,
    pub reasoning: Vec<String>,
    /// Matched blocks, highest confidence first. `None` for a report built
    /// from a cached verdict.
    pub blocks: Option<Vec<BlockLine>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockLine {
    pub text: String,
    pub confidence: f64,
    pub band: ConfidenceBand,
}

impl BlockLine {
    /// Confidence as a percentage with two decimals, e.g. `"87.35%"`.
    pub fn confidence_label(&self) -> String {
        format!("{:.2}%", self.confidence * 100.0)
    }
}

impl From<&BlockScore> for BlockLine {
    fn from(score: &BlockScore) -> Self {
        Self {
            text: score.block.text.clone(),
            confidence: score.confidence,
            band: ConfidenceBand::of(score.confidence),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn of(confidence: f64) -> Self {
        if confidence > 0.75 {
            ConfidenceBand::High
        } else if confidence > 0.5 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceBand::High => "high",
            ConfidenceBand::Medium => "medium",
            ConfidenceBand::Low => "low",
        }
    }
}

pub fn tier_header(tier: Tier) -> &'static str {
    match tier {
        Tier::Strong => "Strong Instructional Content Detected",
        Tier::Moderate => "Possible Instructions Found",
        Tier::None => "No Instructional Content Detected",
    }
}

fn reasoning(verdict: &PageVerdict) -> Vec<String> {
    vec![
        format!(
            "Matched {}/{} with instructions-based text ({}%)",
            verdict.matched_count,
            verdict.total_count,
            verdict.hit_rate_percent()
        ),
        format!(
            "Average Confidence: {}%",
            verdict.average_confidence_percent()
        ),
    ]
}

impl PanelReport {
    pub fn from_analysis(analysis: &PageAnalysis) -> Self {
        Self {
            tier: analysis.verdict.tier,
            header: tier_header(analysis.verdict.tier).to_string(),
            reasoning: reasoning(&analysis.verdict),
            blocks: Some(analysis.matched.iter().map(BlockLine::from).collect()),
        }
    }

    pub fn from_cached(verdict: &PageVerdict) -> Self {
        Self {
            tier: verdict.tier,
            header: tier_header(verdict.tier).to_string(),
            reasoning: reasoning(verdict),
            blocks: None,
        }
    }
}

/// The result of a remote extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnrichmentView {
    Instructions { text: String },
    Empty,
    QuotaExceeded { message: String },
}

impl From<EnrichmentOutcome> for EnrichmentView {
    fn from(outcome: EnrichmentOutcome) -> Self {
        match outcome {
            EnrichmentOutcome::Instructions { text } => EnrichmentView::Instructions { text },
            EnrichmentOutcome::Empty => EnrichmentView::Empty,
            EnrichmentOutcome::QuotaExceeded { message } => {
                EnrichmentView::QuotaExceeded { message }
            }
        }
    }
}

impl PanelState {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            view: PanelView::Loading,
        }
    }

    /// Plain-text rendering of the panel.
    pub fn render_text(&self) -> String {
        let mut out = format!("{}\n{}\n\n", self.title, self.url);

        match &self.view {
            PanelView::Loading => out.push_str("Analyzing page...\n"),
            PanelView::Error(message) => {
                out.push_str(&format!("Error: {message}\n"));
            }
            PanelView::Report(report) => {
                out.push_str(&report.header);
                out.push('\n');
                for line in &report.reasoning {
                    out.push_str(&format!("  {line}\n"));
                }
                match &report.blocks {
                    Some(blocks) if blocks.is_empty() => {
                        out.push('\n');
                        out.push_str(NO_MATCHES_MESSAGE);
                        out.push('\n');
                    }
                    Some(blocks) => {
                        out.push('\n');
                        for block in blocks {
                            out.push_str(&format!(
                                "[{:<6}] {}\n         Confidence: {}\n",
                                block.band.as_str(),
                                block.text,
                                block.confidence_label()
                            ));
                        }
                    }
                    None => {}
                }
            }
            PanelView::Enrichment(EnrichmentView::Instructions { text }) => {
                out.push_str(text.trim_end());
                out.push('\n');
            }
            PanelView::Enrichment(EnrichmentView::Empty) => {
                out.push_str(EMPTY_ENRICHMENT_MESSAGE);
                out.push('\n');
            }
            PanelView::Enrichment(EnrichmentView::QuotaExceeded { message }) => {
                out.push_str(message);
                out.push('\n');
            }
        }

        out
    }
}

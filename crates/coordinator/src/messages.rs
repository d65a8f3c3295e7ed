//! Messages exchanged between the background coordinator and page contexts.
//!
//! Every request has exactly one handler and produces exactly one response.

use serde::{Deserialize, Serialize};
use stepscout_core::{PageAnalysis, TabId, Tier};
use stepscout_scoring::SkipReason;

use crate::panel::PanelState;

/// Background → page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ContentRequest {
    /// Score the page. A visible pass renders into the panel; a silent one
    /// reports the tier back to the background instead.
    ExtractInstructions {
        #[serde(default)]
        visible: bool,
    },
    GetPageText,
    #[serde(rename = "toggleFloatingUI")]
    ToggleFloatingUi,
    TriggerRemoteExtraction,
}

/// Page → background, as the reply to a [`ContentRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum ContentResponse {
    Analyzed(PageAnalysis),
    Skipped(SkipReason),
    /// Another analysis of this page was already running.
    Coalesced,
    PageText(String),
    Panel(PanelState),
}

/// Page → background, unsolicited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum BackgroundMessage {
    InstructionAnalysisResult { tier: Tier },
}

/// A [`BackgroundMessage`] with the tab it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub tab: TabId,
    pub message: BackgroundMessage,
}

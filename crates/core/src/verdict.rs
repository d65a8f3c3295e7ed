//! Page-level verdicts and the tier rule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::block::BlockScore;

/// Coarse strength of instructional content on a page.
///
/// Variants are ordered: `None < Moderate < Strong`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    None,
    Moderate,
    Strong,
}

impl Tier {
    /// Classify a page from its aggregate statistics.
    ///
    /// Rules are evaluated in order, first match wins:
    /// 1. strong: `(matched >= 15 && hit >= 0.20 && avg >= 0.45) || (hit >= 0.25 && avg >= 0.35)`
    /// 2. moderate: `matched >= 5 && ((hit >= 0.10 && avg >= 0.35) || (hit >= 0.14 && avg >= 0.25))`
    /// 3. none
    pub fn classify(matched_count: usize, hit_rate: f64, average_confidence: f64) -> Self {
        let strong = (matched_count >= 15 && hit_rate >= 0.20 && average_confidence >= 0.45)
            || (hit_rate >= 0.25 && average_confidence >= 0.35);
        if strong {
            return Tier::Strong;
        }

        let moderate = matched_count >= 5
            && ((hit_rate >= 0.10 && average_confidence >= 0.35)
                || (hit_rate >= 0.14 && average_confidence >= 0.25));
        if moderate {
            return Tier::Moderate;
        }

        Tier::None
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::None => "none",
            Tier::Moderate => "moderate",
            Tier::Strong => "strong",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The persisted outcome of one page analysis, keyed by URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageVerdict {
    /// Fully-qualified page URL at analysis time.
    pub url: String,
    pub tier: Tier,
    pub matched_count: usize,
    pub total_count: usize,
    /// `matched_count / total_count`, 0 when nothing was scored.
    pub hit_rate: f64,
    /// Mean confidence over matched blocks only.
    pub average_confidence: f64,
    pub analyzed_at: DateTime<Utc>,
}

impl PageVerdict {
    /// Hit rate as a percentage with one decimal place.
    pub fn hit_rate_percent(&self) -> String {
        format!("{:.1}", self.hit_rate * 100.0)
    }

    /// Average confidence as a percentage with one decimal place.
    pub fn average_confidence_percent(&self) -> String {
        format!("{:.1}", self.average_confidence * 100.0)
    }
}

/// The transient result of a scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageAnalysis {
    pub verdict: PageVerdict,
    /// Matched blocks, highest confidence first.
    pub matched: Vec<BlockScore>,
}

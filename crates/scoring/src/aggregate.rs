//! Page aggregation: block scores to a tiered verdict.

use chrono::Utc;
use stepscout_core::{BlockScore, PageAnalysis, PageVerdict, Tier};
use tracing::debug;

/// Summarize the block scores of one page.
///
/// The result does not depend on the order of `scores`. Matched blocks are
/// returned highest confidence first.
pub fn aggregate(url: &str, scores: &[BlockScore]) -> PageAnalysis {
    let total_count = scores.len();
    let mut matched: Vec<BlockScore> = scores.iter().filter(|s| s.is_match()).cloned().collect();
    let matched_count = matched.len();

    let hit_rate = if total_count == 0 {
        0.0
    } else {
        matched_count as f64 / total_count as f64
    };

    let average_confidence = if matched_count == 0 {
        0.0
    } else {
        matched.iter().map(|s| s.confidence).sum::<f64>() / matched_count as f64
    };

    let tier = if total_count == 0 {
        Tier::None
    } else {
        Tier::classify(matched_count, hit_rate, average_confidence)
    };

    matched.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    debug!(
        url,
        tier = ?tier,
        matched_count,
        total_count,
        hit_rate,
        average_confidence,
        "Aggregated page"
    );

    PageAnalysis {
        verdict: PageVerdict {
            url: url.to_string(),
            tier,
            matched_count,
            total_count,
            hit_rate,
            average_confidence,
            analyzed_at: Utc::now(),
        },
        matched,
    }
}

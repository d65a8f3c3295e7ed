//! `stepscout scan`: Silent analysis of one page.

use stepscout_config::AppConfig;
use stepscout_coordinator::ContentResponse;

use crate::runtime::{Runtime, TAB};

pub async fn run(source: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let mut runtime = Runtime::build(config)?;

    let url = runtime.open_page(source).await?;
    let response = runtime.scan().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    match response {
        ContentResponse::Analyzed(analysis) => {
            let verdict = &analysis.verdict;
            println!("🔎 {}", verdict.url);
            println!("  Tier:        {}", verdict.tier.as_str());
            println!(
                "  Matched:     {}/{} blocks ({}%)",
                verdict.matched_count,
                verdict.total_count,
                verdict.hit_rate_percent()
            );
            println!("  Confidence:  {}%", verdict.average_confidence_percent());
            println!("  State:       {:?}", runtime.coordinator.state(TAB).await);
        }
        ContentResponse::Skipped(reason) => {
            println!("⏭️  {url} was not analyzed ({reason})");
        }
        other => println!("{other:?}"),
    }

    Ok(())
}

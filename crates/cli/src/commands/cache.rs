//! `stepscout cache`: Verdict cache management.

use stepscout_config::AppConfig;
use stepscout_core::VerdictStore;
use stepscout_store::FileVerdictStore;

fn store() -> Result<FileVerdictStore, Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    Ok(FileVerdictStore::new(config.storage.resolved_cache_path()))
}

pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let store = store()?;
    let verdicts = store.list().await?;

    println!("🗂️  Cached verdicts ({})", verdicts.len());
    println!("====================");
    if verdicts.is_empty() {
        println!("   No pages analyzed yet.");
        return Ok(());
    }

    for verdict in &verdicts {
        println!(
            "  {:<9} {:>3}/{:<3} {}  {}",
            verdict.tier.as_str(),
            verdict.matched_count,
            verdict.total_count,
            verdict.analyzed_at.format("%Y-%m-%d %H:%M"),
            verdict.url
        );
    }

    Ok(())
}

pub async fn show(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    match store()?.get(url).await? {
        Some(verdict) => println!("{}", serde_json::to_string_pretty(&verdict)?),
        None => println!("No cached verdict for {url}"),
    }
    Ok(())
}

pub async fn remove(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if store()?.remove(url).await? {
        println!("🗑️  Removed {url}");
    } else {
        println!("No cached verdict for {url}");
    }
    Ok(())
}

pub async fn clear() -> Result<(), Box<dyn std::error::Error>> {
    let store = store()?;
    let count = store.count().await?;
    store.clear().await?;
    println!("🗑️  Cleared {count} cached verdicts");
    Ok(())
}

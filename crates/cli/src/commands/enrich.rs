//! `stepscout enrich`: Remote extraction of a page's steps.

use stepscout_config::AppConfig;
use stepscout_coordinator::{ContentRequest, ContentResponse, PageChannel};

use crate::runtime::{Runtime, TAB};

pub async fn run(source: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let runtime = Runtime::build(config)?;

    runtime.open_page(source).await?;
    println!("📡 Asking {} ...\n", runtime.config.remote.endpoint);

    match runtime
        .channel
        .send(TAB, ContentRequest::TriggerRemoteExtraction)
        .await?
    {
        ContentResponse::Panel(panel) => print!("{}", panel.render_text()),
        other => println!("{other:?}"),
    }

    Ok(())
}

//! `stepscout open`: Open the floating panel for a page.

use stepscout_config::AppConfig;
use stepscout_coordinator::{ContentResponse, CoordinatorEvent};

use crate::runtime::{Runtime, TAB};

pub async fn run(source: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let mut runtime = Runtime::build(config)?;

    runtime.open_page(source).await?;
    let response = runtime
        .coordinator
        .handle(CoordinatorEvent::ActionClicked { tab: TAB })
        .await?;
    runtime.deliver_reports().await?;

    match response {
        Some(ContentResponse::Panel(panel)) => print!("{}", panel.render_text()),
        Some(other) => println!("{other:?}"),
        None => println!("No response from the page"),
    }

    Ok(())
}

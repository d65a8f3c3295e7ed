//! `stepscout notifications`: The strong-page notification opt-out.

use stepscout_config::AppConfig;
use stepscout_core::Preferences;
use stepscout_store::FilePreferences;

fn preferences() -> Result<FilePreferences, Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    Ok(FilePreferences::new(config.storage.resolved_state_path()))
}

pub async fn set(enabled: bool) -> Result<(), Box<dyn std::error::Error>> {
    preferences()?.set_notifications_enabled(enabled).await?;
    if enabled {
        println!("🔔 Notifications enabled");
    } else {
        println!("🔕 Notifications disabled");
    }
    Ok(())
}

pub async fn status() -> Result<(), Box<dyn std::error::Error>> {
    let enabled = preferences()?.notifications_enabled().await?;
    println!(
        "Notifications are {}",
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}

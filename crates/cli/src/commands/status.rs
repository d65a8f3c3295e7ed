//! `stepscout status`: Show system status.

use stepscout_config::AppConfig;
use stepscout_core::{Preferences, VerdictStore};
use stepscout_store::{FilePreferences, FileVerdictStore};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let model_path = config.model.resolved_model_path();
    let vocab_path = config.model.resolved_vocab_path();
    let store = FileVerdictStore::new(config.storage.resolved_cache_path());
    let preferences = FilePreferences::new(config.storage.resolved_state_path());
    let notifications = preferences.notifications_enabled().await?;

    println!("StepScout Status");
    println!("================");
    println!("  Config dir:     {}", AppConfig::config_dir().display());
    println!("  Model:          {} {}", model_path.display(), found(model_path.exists()));
    println!("  Vocabulary:     {} {}", vocab_path.display(), found(vocab_path.exists()));
    println!(
        "  ONNX support:   {}",
        if cfg!(feature = "onnx") { "built in" } else { "not built (use --features onnx)" }
    );
    println!("  Remote:         {}", config.remote.endpoint);
    println!("  Notifications:  {}", if notifications { "enabled" } else { "disabled" });
    println!("  Cached pages:   {} ({})", store.count().await?, store.path().display());
    println!("  Skip patterns:  {}", config.scan.skip_patterns.len());

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file, run `stepscout onboard` first");
    }

    Ok(())
}

fn found(exists: bool) -> &'static str {
    if exists { "✅" } else { "(missing)" }
}

//! `stepscout onboard`: First-time setup.

use stepscout_config::AppConfig;
use stepscout_core::Preferences;
use stepscout_store::FilePreferences;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");
    let model_dir = AppConfig::model_dir();

    println!("StepScout: First-Time Setup");
    println!("============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if !model_dir.exists() {
        std::fs::create_dir_all(&model_dir)?;
        println!("✅ Created model directory: {}", model_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
    }

    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let preferences = FilePreferences::new(config.storage.resolved_state_path());
    let installation_id = preferences.installation_id().await?;
    println!("✅ Installation id: {installation_id}");

    let model_path = config.model.resolved_model_path();
    let vocab_path = config.model.resolved_vocab_path();
    println!("\n📝 Next steps:");
    if !model_path.exists() || !vocab_path.exists() {
        println!("   1. Place the classifier at {}", model_path.display());
        println!("   2. Place its vocabulary at {}", vocab_path.display());
        println!("   3. Run: stepscout scan <file-or-url>");
    } else {
        println!("   Run: stepscout scan <file-or-url>");
    }

    Ok(())
}

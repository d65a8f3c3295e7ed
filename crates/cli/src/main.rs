//! StepScout CLI: the main entry point.
//!
//! Commands:
//! - `onboard`: Initialize config, state and model directory
//! - `status`: Show configuration and cache status
//! - `scan`: Silently analyze a page (file or URL)
//! - `open`: Open the analysis panel for a page
//! - `enrich`: Ask the remote endpoint to extract the steps
//! - `notifications`: Toggle or show the notification opt-out
//! - `cache`: Inspect or clear cached verdicts

use clap::{Parser, Subcommand};

mod commands;
mod runtime;

#[derive(Parser)]
#[command(
    name = "stepscout",
    about = "StepScout: find step-by-step instructions on web pages",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and state
    Onboard,

    /// Show system status
    Status,

    /// Analyze a page without opening the panel
    Scan {
        /// Path to an HTML file, or an http(s) URL
        source: String,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Open the analysis panel for a page
    Open {
        /// Path to an HTML file, or an http(s) URL
        source: String,
    },

    /// Extract the instructions of a page with the remote endpoint
    Enrich {
        /// Path to an HTML file, or an http(s) URL
        source: String,
    },

    /// Manage strong-page notifications
    Notifications {
        #[command(subcommand)]
        action: NotificationAction,
    },

    /// Manage the verdict cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum NotificationAction {
    /// Enable notifications
    On,
    /// Disable notifications
    Off,
    /// Show whether notifications are enabled
    Status,
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cached verdicts
    List,
    /// Show the cached verdict for a URL
    Show { url: String },
    /// Remove the cached verdict for a URL
    Remove { url: String },
    /// Remove every cached verdict
    Clear,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Status => commands::status::run().await?,
        Commands::Scan { source, json } => commands::scan::run(&source, json).await?,
        Commands::Open { source } => commands::open::run(&source).await?,
        Commands::Enrich { source } => commands::enrich::run(&source).await?,
        Commands::Notifications { action } => match action {
            NotificationAction::On => commands::notifications::set(true).await?,
            NotificationAction::Off => commands::notifications::set(false).await?,
            NotificationAction::Status => commands::notifications::status().await?,
        },
        Commands::Cache { action } => match action {
            CacheAction::List => commands::cache::list().await?,
            CacheAction::Show { url } => commands::cache::show(&url).await?,
            CacheAction::Remove { url } => commands::cache::remove(&url).await?,
            CacheAction::Clear => commands::cache::clear().await?,
        },
    }

    Ok(())
}

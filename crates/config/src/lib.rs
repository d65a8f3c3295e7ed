//! Configuration loading, validation, and management for StepScout.
//!
//! Loads configuration from `~/.stepscout/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.stepscout/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Local classifier artifacts
    #[serde(default)]
    pub model: ModelConfig,

    /// Remote enrichment endpoint
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Page skip rules
    #[serde(default)]
    pub scan: ScanConfig,

    /// Notification presentation
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Where persisted state lives
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the ONNX model file (default: `~/.stepscout/model/model.onnx`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,

    /// Path to the vocabulary JSON (default: `~/.stepscout/model/vocab.json`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocab_path: Option<String>,
}

impl ModelConfig {
    pub fn resolved_model_path(&self) -> PathBuf {
        self.model_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| AppConfig::model_dir().join("model.onnx"))
    }

    pub fn resolved_vocab_path(&self) -> PathBuf {
        self.vocab_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| AppConfig::model_dir().join("vocab.json"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Full URL of the `/generate` endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8080/generate".into()
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Pages whose main content is shorter than this are skipped
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,

    /// Regex patterns for URLs that never carry instructional content
    #[serde(default = "default_skip_patterns")]
    pub skip_patterns: Vec<String>,
}

fn default_min_content_chars() -> usize {
    200
}

fn default_skip_patterns() -> Vec<String> {
    [
        r"^chrome://",
        r"^about:",
        r"mail\.google\.com",
        r"docs\.google\.com",
        r"drive\.google\.com",
        r"calendar\.google\.com",
        r"meet\.google\.com",
        r"web\.whatsapp\.com",
        r"web\.telegram\.org",
        r"web\.skype\.com",
        r"outlook\.live\.com",
        r"facebook\.com",
        r"twitter\.com",
        r"instagram\.com",
        r"youtube\.com/watch",
        r"netflix\.com/watch",
        r"reddit\.com",
        r"discord\.com",
        r"accounts\.google\.com",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_content_chars: default_min_content_chars(),
            skip_patterns: default_skip_patterns(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Seconds before a notification is dismissed automatically
    #[serde(default = "default_dismiss_after_secs")]
    pub dismiss_after_secs: u64,

    #[serde(default = "default_notification_title")]
    pub title: String,

    #[serde(default = "default_notification_message")]
    pub message: String,
}

fn default_dismiss_after_secs() -> u64 {
    5
}
fn default_notification_title() -> String {
    "StepScout found instructions".into()
}
fn default_notification_message() -> String {
    "One click → clean steps".into()
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            dismiss_after_secs: default_dismiss_after_secs(),
            title: default_notification_title(),
            message: default_notification_message(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Verdict cache file (default: `~/.stepscout/cache/verdicts.jsonl`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<String>,

    /// Preferences file (default: `~/.stepscout/state.json`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_path: Option<String>,
}

impl StorageConfig {
    pub fn resolved_cache_path(&self) -> PathBuf {
        self.cache_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| AppConfig::config_dir().join("cache").join("verdicts.jsonl"))
    }

    pub fn resolved_state_path(&self) -> PathBuf {
        self.state_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| AppConfig::config_dir().join("state.json"))
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.stepscout/config.toml).
    ///
    /// Environment variables override file values:
    /// - `STEPSCOUT_MODEL_PATH`
    /// - `STEPSCOUT_VOCAB_PATH`
    /// - `STEPSCOUT_REMOTE_ENDPOINT`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(path) = std::env::var("STEPSCOUT_MODEL_PATH") {
            config.model.model_path = Some(path);
        }
        if let Ok(path) = std::env::var("STEPSCOUT_VOCAB_PATH") {
            config.model.vocab_path = Some(path);
        }
        if let Ok(endpoint) = std::env::var("STEPSCOUT_REMOTE_ENDPOINT") {
            config.remote.endpoint = endpoint;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".stepscout")
    }

    /// Get the directory holding the model artifacts.
    pub fn model_dir() -> PathBuf {
        Self::config_dir().join("model")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.remote.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::ValidationError(
                "remote.endpoint must not be empty".into(),
            ));
        }
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "remote.endpoint must be an http(s) URL, got '{endpoint}'"
            )));
        }

        if self.remote.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "remote.timeout_secs must be > 0".into(),
            ));
        }

        for pattern in &self.scan.skip_patterns {
            regex_lite::Regex::new(pattern).map_err(|e| {
                ConfigError::ValidationError(format!("invalid skip pattern '{pattern}': {e}"))
            })?;
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            remote: RemoteConfig::default(),
            scan: ScanConfig::default(),
            notifications: NotificationConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

//! Error types for the StepScout domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all StepScout operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Local model errors ---
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    // --- Persisted state errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Remote enrichment errors ---
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    // --- Notification errors ---
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    // --- Cross-context messaging errors ---
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of the local classifier.
///
/// `LoadFailed` is fatal for an analysis pass. `Inference` only affects the
/// sentence being scored and is recovered by the block scorer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Model failed to load: {0}")]
    LoadFailed(String),

    #[error("Inference failed: {0}")]
    Inference(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// Failures talking to the remote enrichment endpoint.
///
/// A quota response (HTTP 429) is *not* an error; it is reported as an
/// outcome by the remote client.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RemoteError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote endpoint returned {status_code}: {message}")]
    Http { status_code: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification could not be presented: {0}")]
    PresentationFailed(String),
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("No page context registered for tab {0}")]
    UnknownTab(u32),

    #[error("Page context for tab {tab} failed: {reason}")]
    HandlerFailed { tab: u32, reason: String },
}

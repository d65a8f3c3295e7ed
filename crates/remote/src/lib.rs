//! Remote enrichment: asks a generative endpoint to rewrite a page's text
//! as a clean list of steps.
//!
//! The endpoint contract is a single call:
//! `POST {endpoint}` with `{ "userId": ..., "prompt": ... }`, answered by
//! `{ "response": ... }`. A 429 means the installation's daily quota is used
//! up and carries `{ "error": ... }`.
//!
//! Nothing here touches the local model or the verdict cache.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stepscout_config::RemoteConfig;
use stepscout_core::error::RemoteError;
use tracing::{debug, info, warn};

/// Prefix prepended to the page text to form the prompt.
pub const PROMPT_PREFIX: &str = "Extract instructions:\n";

/// Shown when a 429 response carries no message of its own.
pub const DEFAULT_QUOTA_MESSAGE: &str = "Daily limit reached (3 requests max/day)";

/// What a completed enrichment call produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnrichmentOutcome {
    /// The endpoint returned a non-empty instruction list.
    Instructions { text: String },
    /// The endpoint answered but found nothing to extract.
    Empty,
    /// The daily quota is exhausted.
    QuotaExceeded { message: String },
}

impl EnrichmentOutcome {
    /// Short label for logs and events.
    pub fn label(&self) -> &'static str {
        match self {
            EnrichmentOutcome::Instructions { .. } => "instructions",
            EnrichmentOutcome::Empty => "empty",
            EnrichmentOutcome::QuotaExceeded { .. } => "quota_exceeded",
        }
    }
}

/// Anything that can turn page text into extracted instructions.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn extract(
        &self,
        user_id: &str,
        page_text: &str,
    ) -> Result<EnrichmentOutcome, RemoteError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    user_id: &'a str,
    prompt: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for the `/generate` endpoint.
pub struct EnrichmentClient {
    endpoint: String,
    client: reqwest::Client,
}

impl EnrichmentClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self, RemoteError> {
        Self::new(
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn build_prompt(page_text: &str) -> String {
        format!("{PROMPT_PREFIX}{page_text}")
    }
}

#[async_trait]
impl Enricher for EnrichmentClient {
    async fn extract(
        &self,
        user_id: &str,
        page_text: &str,
    ) -> Result<EnrichmentOutcome, RemoteError> {
        let body = GenerateRequest {
            user_id,
            prompt: Self::build_prompt(page_text),
        };

        debug!(endpoint = %self.endpoint, chars = page_text.len(), "Sending enrichment request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_QUOTA_MESSAGE.to_string());
            info!(%message, "Enrichment quota exhausted");
            return Ok(EnrichmentOutcome::QuotaExceeded { message });
        }

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Enrichment endpoint returned error");
            return Err(RemoteError::Http {
                status_code: status,
                message: error_body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(format!("Failed to parse response: {e}")))?;

        match parsed.response {
            Some(text) if !text.trim().is_empty() => {
                debug!(chars = text.len(), "Enrichment returned instructions");
                Ok(EnrichmentOutcome::Instructions { text })
            }
            _ => Ok(EnrichmentOutcome::Empty),
        }
    }
}

//! External model adapter.
//!
//! Two capability layers:
//! - [`CompletionClient`]: one outbound text-generation call (Gemini, Ollama)
//! - [`ModelBackend`]: turns that call into a deep result, falling back to
//!   the local result on any failure
//!
//! Backends never surface errors to the pipeline. Transport and contract
//! failures are logged and replaced by the caller-supplied local result.

mod gemini;
mod heuristic;
mod ollama;
pub mod parse;
mod strict;

pub use gemini::GeminiClient;
pub use heuristic::HeuristicBackend;
pub use ollama::OllamaClient;
pub use strict::StrictBackend;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;
use vibe_common::{BackendKind, Config, Error, Result, ResultExt};

use crate::normalizer::NormalizerPolicy;
use crate::types::EnrichedResult;

// ============================================================================
// Traits
// ============================================================================

/// Deep-analysis capability backed by an external model.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Enrich `text`. `local` is the enhanced local result and doubles as the
    /// fallback; the returned value is always schema-conformant.
    async fn analyze_external(&self, text: &str, local: &EnrichedResult) -> EnrichedResult;
}

/// A single outbound text-generation request.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Client name for logs.
    fn name(&self) -> &str;

    /// Send `prompt` and return the model's raw text reply.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> std::result::Result<String, BackendError>;
}

// ============================================================================
// Request parameters and errors
// ============================================================================

/// Sampling parameters for one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f64,
    pub top_p: Option<f64>,
    pub top_k: Option<u32>,
    pub max_tokens: u32,
}

impl GenerationParams {
    /// Near-deterministic sampling for the strict JSON contract.
    pub const STRICT: Self = Self {
        temperature: 0.1,
        top_p: Some(0.1),
        top_k: Some(16),
        max_tokens: 1024,
    };

    /// Short budget for the merge heuristic.
    pub const HEURISTIC: Self = Self {
        temperature: 0.1,
        top_p: None,
        top_k: None,
        max_tokens: 128,
    };
}

/// Outbound call failure.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection, DNS or TLS failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// No reply within the bound
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Reply arrived but had an unexpected shape
    #[error("unexpected response body: {0}")]
    Body(String),
}

impl BackendError {
    /// Classify a reqwest failure.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_decode() {
            Self::Body(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Reads a non-success response into a [`BackendError::Status`].
pub(crate) async fn status_error(response: reqwest::Response) -> BackendError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    BackendError::Status { status, body }
}

/// Bound a future by `timeout`, mapping expiry to [`BackendError::Timeout`].
pub(crate) async fn with_timeout<F>(
    timeout: Duration,
    fut: F,
) -> std::result::Result<String, BackendError>
where
    F: std::future::Future<Output = std::result::Result<String, BackendError>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .unwrap_or_else(|_| Err(BackendError::Timeout(timeout)))
}

// ============================================================================
// Construction
// ============================================================================

/// Settings shared by both backend variants.
#[derive(Debug, Clone, Copy)]
pub struct BackendSettings {
    /// Bound on the single outbound call
    pub timeout: Duration,
    /// Limits applied to the merged or parsed result
    pub policy: NormalizerPolicy,
}

impl BackendSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.backend.timeout(),
            policy: NormalizerPolicy::from(&config.analysis),
        }
    }
}

/// Build the backend selected by configuration, or `None` for local-only.
pub fn build_backend(config: &Config) -> Result<Option<Arc<dyn ModelBackend>>> {
    let settings = BackendSettings::from_config(config);
    let backend = &config.backend;

    let built: Arc<dyn ModelBackend> = match backend.kind {
        BackendKind::None => return Ok(None),
        BackendKind::Strict => {
            let api_key = backend
                .gemini
                .api_key
                .as_deref()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| {
                    Error::Config(
                        "strict backend requires backend.gemini.api_key (or GEMINI_API_KEY)"
                            .into(),
                    )
                })?;
            let client = GeminiClient::new(
                &backend.gemini.base_url,
                &backend.gemini.model,
                api_key,
                settings.timeout,
            )
            .context("failed to build Gemini client")?;
            Arc::new(StrictBackend::new(Arc::new(client), settings))
        }
        BackendKind::Heuristic => {
            let client = OllamaClient::new(
                &backend.ollama.base_url,
                &backend.ollama.model,
                settings.timeout,
            )
            .context("failed to build Ollama client")?;
            Arc::new(HeuristicBackend::new(Arc::new(client), settings))
        }
    };

    info!(
        backend = built.name(),
        timeout_ms = backend.timeout_ms,
        min_length = backend.min_length_for_external,
        "External model backend configured"
    );

    Ok(Some(built))
}

/// Build a reqwest client carrying the request timeout.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .build()
        .map_err(|e| Error::External(format!("failed to build HTTP client: {}", e)))
}

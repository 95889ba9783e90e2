//! Strict-contract backend.
//!
//! Asks for exactly the five-field JSON object and accepts nothing else.
//! Any failure returns the local result marked `Failure`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::parse::parse_strict;
use super::{with_timeout, BackendSettings, CompletionClient, GenerationParams, ModelBackend};
use crate::normalizer::normalize;
use crate::types::{ApiStatus, EnrichedResult, ParseOutcome};

/// Backend that trusts only a well-formed five-field reply.
pub struct StrictBackend {
    client: Arc<dyn CompletionClient>,
    settings: BackendSettings,
}

impl StrictBackend {
    pub fn new(client: Arc<dyn CompletionClient>, settings: BackendSettings) -> Self {
        Self { client, settings }
    }

    /// Build the analysis prompt.
    fn build_prompt(&self, text: &str) -> String {
        format!(
            r#"You are a sentiment analysis expert. Analyze the following text and respond with a JSON object.

Rules:
1. Respond ONLY with a JSON object
2. Do not include any other text, markdown formatting, or explanations
3. The JSON must exactly follow this structure:
{{
    "sentiment": one of ["positive", "negative", "neutral"],
    "sentiment_score": number between -1 and 1,
    "topics": array of strings,
    "content_warnings": array of strings,
    "summary": string
}}

Text to analyze: {}"#,
            // JSON-quoted so the text cannot break out of the prompt framing
            serde_json::Value::String(text.to_string())
        )
    }
}

#[async_trait]
impl ModelBackend for StrictBackend {
    fn name(&self) -> &str {
        "strict"
    }

    async fn analyze_external(&self, text: &str, local: &EnrichedResult) -> EnrichedResult {
        let prompt = self.build_prompt(text);
        let reply = with_timeout(
            self.settings.timeout,
            self.client.generate(&prompt, &GenerationParams::STRICT),
        )
        .await;

        let fallback = || local.clone().with_status(ApiStatus::Failure);

        let raw = match reply {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    client = self.client.name(),
                    error = %e,
                    "Strict backend request failed, using local analysis"
                );
                return fallback();
            }
        };

        match parse_strict(&raw) {
            ParseOutcome::Valid(candidate) => {
                debug!(client = self.client.name(), "Strict backend reply accepted");
                normalize(candidate, text, &self.settings.policy).with_status(ApiStatus::Success)
            }
            ParseOutcome::Invalid(reason) => {
                warn!(
                    client = self.client.name(),
                    reason = %reason,
                    "Strict backend reply rejected, using local analysis"
                );
                fallback()
            }
        }
    }
}

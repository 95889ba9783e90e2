//! Merge-heuristic backend.
//!
//! Sends the local result along with the text and lets the model refine
//! it. Whatever the model gets right is merged over the local result;
//! everything else keeps the local value. Fallbacks are still reported as
//! `Success` because the local result is a complete answer on its own.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use super::parse::parse_merge;
use super::{with_timeout, BackendSettings, CompletionClient, GenerationParams, ModelBackend};
use crate::normalizer::normalize;
use crate::types::{ApiStatus, EnrichedResult, ParseOutcome, Sentiment};

/// Characters of source text embedded in the prompt.
const PROMPT_TEXT_CHARS: usize = 500;

/// The five schema fields of a local result, as shown to the model.
#[derive(Serialize)]
struct CurrentAnalysis<'a> {
    sentiment: Sentiment,
    sentiment_score: f64,
    topics: &'a [String],
    content_warnings: &'a [String],
    summary: &'a str,
}

impl<'a> From<&'a EnrichedResult> for CurrentAnalysis<'a> {
    fn from(result: &'a EnrichedResult) -> Self {
        Self {
            sentiment: result.sentiment,
            sentiment_score: result.sentiment_score,
            topics: &result.topics,
            content_warnings: &result.content_warnings,
            summary: &result.summary,
        }
    }
}

pub struct HeuristicBackend {
    client: Arc<dyn CompletionClient>,
    settings: BackendSettings,
}

impl HeuristicBackend {
    pub fn new(client: Arc<dyn CompletionClient>, settings: BackendSettings) -> Self {
        Self { client, settings }
    }

    fn build_prompt(&self, text: &str, local: &EnrichedResult) -> String {
        let excerpt: String = text.chars().take(PROMPT_TEXT_CHARS).collect();
        let current = serde_json::to_string(&CurrentAnalysis::from(local))
            .unwrap_or_else(|_| "{}".to_string());

        format!(
            r#"Analyze this text and provide a JSON response with:
- sentiment (ONLY "positive", "negative", or "neutral")
- topics (array of topic strings)
- content_warnings (array of warning strings)
- summary (single string)

Text: {}

Current analysis: {}

Respond with the JSON object only."#,
            serde_json::Value::String(excerpt),
            current
        )
    }
}

#[async_trait]
impl ModelBackend for HeuristicBackend {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn analyze_external(&self, text: &str, local: &EnrichedResult) -> EnrichedResult {
        let prompt = self.build_prompt(text, local);
        let reply = with_timeout(
            self.settings.timeout,
            self.client.generate(&prompt, &GenerationParams::HEURISTIC),
        )
        .await;

        let fallback = || local.clone().with_status(ApiStatus::Success);

        let raw = match reply {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    client = self.client.name(),
                    error = %e,
                    "Heuristic backend request failed, keeping local analysis"
                );
                return fallback();
            }
        };

        match parse_merge(&raw, local) {
            ParseOutcome::Valid(candidate) => {
                debug!(client = self.client.name(), "Merged model reply into local analysis");
                normalize(candidate, text, &self.settings.policy).with_status(ApiStatus::Success)
            }
            ParseOutcome::Invalid(reason) => {
                debug!(
                    client = self.client.name(),
                    reason = %reason,
                    "Unusable model reply, keeping local analysis"
                );
                fallback()
            }
        }
    }
}

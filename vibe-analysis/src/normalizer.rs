//! Schema normalizer for deep results.
//!
//! Turns an untrusted [`CandidateResult`] into an [`EnrichedResult`] that
//! satisfies every schema rule: label in the enum, finite score in
//! [-1, 1], bounded non-empty topics, non-empty summary. Pure, total and
//! idempotent.

use serde_json::Value;
use vibe_common::AnalysisConfig;

use crate::types::{CandidateResult, EnrichedResult, Sentiment, NO_SUMMARY};

/// Qualifiers models like to put in front of a label ("very positive").
const QUALIFIERS: &[&str] = &[
    "very",
    "extremely",
    "slightly",
    "somewhat",
    "mostly",
    "really",
    "quite",
];

/// Object fields that may carry a topic name.
const TOPIC_FIELDS: &[&str] = &["topic", "name"];

/// Object fields that may carry a warning name.
const WARNING_FIELDS: &[&str] = &["type", "warning", "name"];

/// Limits applied during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizerPolicy {
    pub max_topics: usize,
    pub fallback_summary_chars: usize,
}

impl Default for NormalizerPolicy {
    fn default() -> Self {
        Self {
            max_topics: 3,
            fallback_summary_chars: 100,
        }
    }
}

impl From<&AnalysisConfig> for NormalizerPolicy {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            max_topics: config.max_topics,
            fallback_summary_chars: config.fallback_summary_chars,
        }
    }
}

/// Normalize a candidate into a schema-conformant result.
pub fn normalize(
    candidate: CandidateResult,
    source_text: &str,
    policy: &NormalizerPolicy,
) -> EnrichedResult {
    let mut topics = string_items(&candidate.topics, TOPIC_FIELDS);
    topics.truncate(policy.max_topics);

    EnrichedResult {
        sentiment: candidate
            .sentiment
            .as_deref()
            .map_or(Sentiment::Neutral, normalize_label),
        sentiment_score: normalize_score(candidate.sentiment_score),
        topics,
        content_warnings: string_items(&candidate.content_warnings, WARNING_FIELDS),
        summary: normalize_summary(candidate.summary.as_ref(), source_text, policy),
        api_status: candidate.api_status,
    }
}

/// Map a free-form label onto the enum.
pub fn normalize_label(raw: &str) -> Sentiment {
    if let Some(label) = Sentiment::parse(raw) {
        return label;
    }

    let lowered = raw.trim().to_lowercase();
    let stripped: Vec<&str> = lowered
        .split_whitespace()
        .filter(|word| !QUALIFIERS.contains(word))
        .collect();

    Sentiment::parse(&stripped.join(" ")).unwrap_or(Sentiment::Neutral)
}

fn normalize_score(score: Option<f64>) -> f64 {
    match score {
        Some(score) if score.is_finite() => score.clamp(-1.0, 1.0),
        _ => 0.0,
    }
}

/// Trimmed non-empty strings from a raw list; objects contribute the first
/// string field found among `fields`.
fn string_items(items: &[Value], fields: &[&str]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.as_str()),
            Value::Object(map) => fields
                .iter()
                .find_map(|field| map.get(*field).and_then(Value::as_str)),
            _ => None,
        })
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_summary(
    summary: Option<&Value>,
    source_text: &str,
    policy: &NormalizerPolicy,
) -> String {
    if let Some(summary) = summary.and_then(Value::as_str) {
        let trimmed = summary.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    fallback_summary(source_text, policy.fallback_summary_chars)
}

/// Excerpt of the source text, or the placeholder when there is none.
pub fn fallback_summary(source_text: &str, max_chars: usize) -> String {
    let source = source_text.trim();
    if source.is_empty() || max_chars == 0 {
        return NO_SUMMARY.to_string();
    }

    let excerpt: String = source.chars().take(max_chars).collect();
    format!("{}...", excerpt.trim_end())
}

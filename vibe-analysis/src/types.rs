//! Result types shared by every analysis tier.
//!
//! The serialized field names are the persisted shape: the quick result uses
//! camelCase keys, the enriched result uses the snake_case keys of the model
//! contract.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Placeholder summary when nothing better is available.
pub const NO_SUMMARY: &str = "No summary available";

/// Sentiment polarity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    /// Map a score onto a label: above `+threshold` is positive, below
    /// `-threshold` negative, anything else (including NaN) neutral.
    pub fn from_score(score: f64, threshold: f64) -> Self {
        if score > threshold {
            Self::Positive
        } else if score < -threshold {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    /// Exact, case-insensitive parse of one of the three labels.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse context bucket for polarized posts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextLabel {
    GoodNews,
    BadNews,
    #[default]
    Neutral,
}

/// Whether the deep result came from its authoritative source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiStatus {
    #[default]
    Success,
    Failure,
}

// ============================================================================
// Quick tier
// ============================================================================

/// Score and label of the quick tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuickSentiment {
    pub score: f64,
    pub label: Sentiment,
}

/// Quick ("basic") annotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickResult {
    pub sentiment: QuickSentiment,
    pub context_label: ContextLabel,
    pub is_flagged: bool,
}

// ============================================================================
// Deep tier
// ============================================================================

/// Deep ("enriched") annotation. Only the normalizer and the enhanced
/// analyzer construct these, so every instance satisfies the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedResult {
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
    pub topics: Vec<String>,
    pub content_warnings: Vec<String>,
    pub summary: String,
    pub api_status: ApiStatus,
}

impl EnrichedResult {
    /// The deep-tier default for skipped or empty input.
    pub fn neutral() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            sentiment_score: 0.0,
            topics: Vec::new(),
            content_warnings: Vec::new(),
            summary: NO_SUMMARY.to_string(),
            api_status: ApiStatus::Success,
        }
    }

    /// Same result with a different status.
    pub fn with_status(mut self, api_status: ApiStatus) -> Self {
        self.api_status = api_status;
        self
    }
}

impl Default for EnrichedResult {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Both annotations for one text unit, in the persisted layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPair {
    #[serde(rename = "basicAnalysis")]
    pub basic: QuickResult,
    #[serde(rename = "llmAnalysis")]
    pub enriched: EnrichedResult,
}

// ============================================================================
// Untrusted candidates
// ============================================================================

/// A deep result whose fields have not been validated yet.
///
/// Lists and the summary stay as raw JSON so the normalizer can decide what
/// to salvage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateResult {
    pub sentiment: Option<String>,
    pub sentiment_score: Option<f64>,
    pub topics: Vec<Value>,
    pub content_warnings: Vec<Value>,
    pub summary: Option<Value>,
    pub api_status: ApiStatus,
}

impl From<EnrichedResult> for CandidateResult {
    fn from(result: EnrichedResult) -> Self {
        Self {
            sentiment: Some(result.sentiment.as_str().to_string()),
            sentiment_score: Some(result.sentiment_score),
            topics: result.topics.into_iter().map(Value::String).collect(),
            content_warnings: result
                .content_warnings
                .into_iter()
                .map(Value::String)
                .collect(),
            summary: Some(Value::String(result.summary)),
            api_status: result.api_status,
        }
    }
}

/// Outcome of validating a model reply against a contract.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Valid(CandidateResult),
    Invalid(String),
}

impl ParseOutcome {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

// ============================================================================
// Pipeline observation
// ============================================================================

/// Which deep path the orchestrator took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeepRoute {
    /// Deep tier disabled or empty text
    Skipped,
    /// Enhanced local analyzer only
    Local,
    /// External backend consulted (its own fallback may still apply)
    External,
}

impl fmt::Display for DeepRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => write!(f, "skipped"),
            Self::Local => write!(f, "local"),
            Self::External => write!(f, "external"),
        }
    }
}

/// A pair together with the route that produced its deep half.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    pub pair: AnalysisPair,
    pub route: DeepRoute,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sentiment_thresholds() {
        assert_eq!(Sentiment::from_score(0.11, 0.1), Sentiment::Positive);
        assert_eq!(Sentiment::from_score(0.1, 0.1), Sentiment::Neutral);
        assert_eq!(Sentiment::from_score(-0.1, 0.1), Sentiment::Neutral);
        assert_eq!(Sentiment::from_score(-0.5, 0.1), Sentiment::Negative);
        assert_eq!(Sentiment::from_score(f64::NAN, 0.1), Sentiment::Neutral);
    }

    #[test]
    fn test_sentiment_parse() {
        assert_eq!(Sentiment::parse(" Positive "), Some(Sentiment::Positive));
        assert_eq!(Sentiment::parse("NEGATIVE"), Some(Sentiment::Negative));
        assert_eq!(Sentiment::parse("very positive"), None);
    }

    #[test]
    fn test_pair_serializes_to_persisted_shape() {
        let pair = AnalysisPair {
            basic: QuickResult {
                sentiment: QuickSentiment {
                    score: 0.5,
                    label: Sentiment::Positive,
                },
                context_label: ContextLabel::GoodNews,
                is_flagged: false,
            },
            enriched: EnrichedResult::neutral().with_status(ApiStatus::Failure),
        };

        let value = serde_json::to_value(&pair).unwrap();
        assert_eq!(
            value,
            json!({
                "basicAnalysis": {
                    "sentiment": {"score": 0.5, "label": "positive"},
                    "contextLabel": "good_news",
                    "isFlagged": false
                },
                "llmAnalysis": {
                    "sentiment": "neutral",
                    "sentiment_score": 0.0,
                    "topics": [],
                    "content_warnings": [],
                    "summary": "No summary available",
                    "api_status": "Failure"
                }
            })
        );
    }

    #[test]
    fn test_candidate_from_enriched_keeps_fields() {
        let result = EnrichedResult {
            sentiment: Sentiment::Negative,
            sentiment_score: -0.4,
            topics: vec!["scan".into()],
            content_warnings: vec!["sensitive_content_harm".into()],
            summary: "scan results".into(),
            api_status: ApiStatus::Success,
        };
        let candidate = CandidateResult::from(result);
        assert_eq!(candidate.sentiment.as_deref(), Some("negative"));
        assert_eq!(candidate.topics, vec![json!("scan")]);
        assert_eq!(candidate.summary, Some(json!("scan results")));
    }
}

//! Enhanced local analyzer.
//!
//! Blends the general lexicon score with the polarity scorer, then extracts
//! frequency topics, sensitive-word warnings and an extractive summary. The
//! output is already in normalized form, so it can stand in for an external
//! result whenever the backend is skipped or fails.

use std::collections::HashMap;
use std::sync::Arc;

use vibe_common::AnalysisConfig;

use crate::lexicon::{Lexicon, PreprocessOptions, Preprocessor};
use crate::types::{ApiStatus, EnrichedResult, Sentiment, NO_SUMMARY};

/// Prefix of every sensitive-word warning.
pub const WARNING_PREFIX: &str = "sensitive_content_";

/// Policy for the enhanced analyzer.
#[derive(Debug, Clone)]
pub struct EnhancedPolicy {
    pub sentiment_threshold: f64,
    pub general_weight: f64,
    pub polarity_weight: f64,
    pub max_topics: usize,
    pub min_topic_length: usize,
    pub summary_tokens: usize,
    pub sensitive: Vec<String>,
}

impl From<&AnalysisConfig> for EnhancedPolicy {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            sentiment_threshold: config.sentiment_threshold,
            general_weight: config.local_weights.general,
            polarity_weight: config.local_weights.polarity,
            max_topics: config.max_topics,
            min_topic_length: config.min_topic_length,
            summary_tokens: config.summary_tokens,
            sensitive: config
                .keywords
                .sensitive
                .iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }
}

impl Default for EnhancedPolicy {
    fn default() -> Self {
        Self::from(&AnalysisConfig::default())
    }
}

/// Local stand-in for the external model.
#[derive(Debug, Clone)]
pub struct EnhancedAnalyzer {
    preprocessor: Preprocessor,
    policy: EnhancedPolicy,
}

impl EnhancedAnalyzer {
    pub fn new(lexicon: Arc<Lexicon>, policy: EnhancedPolicy) -> Self {
        Self {
            preprocessor: Preprocessor::new(lexicon),
            policy,
        }
    }

    pub fn policy(&self) -> &EnhancedPolicy {
        &self.policy
    }

    /// Analyze one text unit. Always reports `Success`.
    pub fn analyze(&self, text: &str) -> EnrichedResult {
        let processed = self.preprocessor.process(
            text,
            PreprocessOptions {
                spell_correct: false,
            },
        );
        let lexicon = self.preprocessor.lexicon();

        let score = self.composite(
            lexicon.general_score(&processed.tokens),
            lexicon.polarity_score(&processed.tokens),
        );

        EnrichedResult {
            sentiment: Sentiment::from_score(score, self.policy.sentiment_threshold),
            sentiment_score: score,
            topics: self.topics(&processed.filtered),
            content_warnings: self.warnings(&processed.tokens),
            summary: self.summary(&processed.filtered),
            api_status: ApiStatus::Success,
        }
    }

    fn composite(&self, general: f64, polarity: f64) -> f64 {
        let (wg, wp) = (
            self.policy.general_weight.max(0.0),
            self.policy.polarity_weight.max(0.0),
        );
        let total = wg + wp;
        if total <= 0.0 {
            return 0.0;
        }

        let blended = (wg * general + wp * polarity) / total;
        if blended.is_finite() {
            blended.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    /// Most frequent long tokens; ties keep first-occurrence order.
    fn topics(&self, filtered: &[String]) -> Vec<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();

        for token in filtered
            .iter()
            .filter(|t| t.chars().count() > self.policy.min_topic_length)
        {
            let count = counts.entry(token.as_str()).or_insert(0);
            if *count == 0 {
                order.push(token.as_str());
            }
            *count += 1;
        }

        // Stable sort keeps first-occurrence order among equal counts.
        order.sort_by(|a, b| counts[b].cmp(&counts[a]));
        order
            .into_iter()
            .take(self.policy.max_topics)
            .map(str::to_string)
            .collect()
    }

    fn warnings(&self, tokens: &[String]) -> Vec<String> {
        tokens
            .iter()
            .filter(|t| self.policy.sensitive.iter().any(|s| s == *t))
            .map(|t| format!("{WARNING_PREFIX}{t}"))
            .collect()
    }

    fn summary(&self, filtered: &[String]) -> String {
        if filtered.is_empty() || self.policy.summary_tokens == 0 {
            return NO_SUMMARY.to_string();
        }
        filtered
            .iter()
            .take(self.policy.summary_tokens)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

//! Quick tier: lexicon sentiment, keyword context label, keyword safety flag.
//!
//! Pure computation over the shared lexicon; never fails and never leaves
//! the process.

use std::sync::Arc;

use vibe_common::AnalysisConfig;

use crate::lexicon::{Lexicon, PreprocessOptions, Preprocessor};
use crate::types::{ContextLabel, QuickResult, QuickSentiment, Sentiment};

/// Keyword lists and thresholds for the quick tier.
#[derive(Debug, Clone)]
pub struct BasicPolicy {
    pub sentiment_threshold: f64,
    pub spell_correct: bool,
    pub good_news: Vec<String>,
    pub bad_news: Vec<String>,
    pub forbidden: Vec<String>,
}

impl From<&AnalysisConfig> for BasicPolicy {
    fn from(config: &AnalysisConfig) -> Self {
        let lower = |words: &[String]| words.iter().map(|w| w.to_lowercase()).collect();
        Self {
            sentiment_threshold: config.sentiment_threshold,
            spell_correct: config.spelling_correction,
            good_news: lower(&config.keywords.good_news),
            bad_news: lower(&config.keywords.bad_news),
            forbidden: lower(&config.keywords.forbidden),
        }
    }
}

impl Default for BasicPolicy {
    fn default() -> Self {
        Self::from(&AnalysisConfig::default())
    }
}

/// Fast local analyzer producing the quick annotation.
#[derive(Debug, Clone)]
pub struct BasicAnalyzer {
    preprocessor: Preprocessor,
    policy: BasicPolicy,
}

impl BasicAnalyzer {
    pub fn new(lexicon: Arc<Lexicon>, policy: BasicPolicy) -> Self {
        Self {
            preprocessor: Preprocessor::new(lexicon),
            policy,
        }
    }

    /// Analyze one text unit.
    pub fn analyze(&self, text: &str) -> QuickResult {
        if text.trim().is_empty() {
            return QuickResult::default();
        }

        let processed = self.preprocessor.process(
            text,
            PreprocessOptions {
                spell_correct: self.policy.spell_correct,
            },
        );

        let score = self.preprocessor.lexicon().general_score(&processed.filtered);
        let label = Sentiment::from_score(score, self.policy.sentiment_threshold);

        let context_label = match label {
            Sentiment::Positive if contains_any(&processed.cleaned, &self.policy.good_news) => {
                ContextLabel::GoodNews
            }
            Sentiment::Negative if contains_any(&processed.cleaned, &self.policy.bad_news) => {
                ContextLabel::BadNews
            }
            _ => ContextLabel::Neutral,
        };

        let is_flagged = contains_any(&processed.cleaned, &self.policy.forbidden);

        QuickResult {
            sentiment: QuickSentiment { score, label },
            context_label,
            is_flagged,
        }
    }
}

/// Substring match of any keyword against already-lowercased text.
fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|keyword| !keyword.is_empty() && haystack.contains(keyword.as_str()))
}

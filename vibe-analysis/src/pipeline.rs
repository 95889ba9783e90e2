//! Content analysis orchestrator.
//!
//! The only entry point callers need. Each text unit runs through:
//!
//! ```text
//! Pending → QuickDone → { DeepSkipped | DeepLocal | DeepExternal } → Final
//! ```
//!
//! The quick tier always runs. The deep tier is skipped for empty text or
//! when disabled, runs locally for short text or when no backend is
//! configured, and otherwise consults the external backend with the local
//! result as its fallback. Every deep result passes the normalizer.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info};
use vibe_common::{Config, Result};

use crate::backend::{build_backend, ModelBackend};
use crate::basic::{BasicAnalyzer, BasicPolicy};
use crate::enhanced::{EnhancedAnalyzer, EnhancedPolicy};
use crate::lexicon::Lexicon;
use crate::normalizer::{normalize, NormalizerPolicy};
use crate::types::{AnalysisPair, DeepRoute, EnrichedResult, PipelineRun};

/// Everything the orchestrator needs besides the lexicon and backend.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Run the deep tier at all
    pub deep_enabled: bool,
    /// Texts must be longer than this (in characters) to reach the backend
    pub min_length_for_external: usize,
    pub basic: BasicPolicy,
    pub enhanced: EnhancedPolicy,
    pub normalizer: NormalizerPolicy,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            deep_enabled: config.analysis.deep_enabled,
            min_length_for_external: config.backend.min_length_for_external,
            basic: BasicPolicy::from(&config.analysis),
            enhanced: EnhancedPolicy::from(&config.analysis),
            normalizer: NormalizerPolicy::from(&config.analysis),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Two-tier content analyzer.
pub struct ContentAnalyzer {
    basic: BasicAnalyzer,
    enhanced: EnhancedAnalyzer,
    backend: Option<Arc<dyn ModelBackend>>,
    settings: PipelineSettings,
}

impl ContentAnalyzer {
    /// Build the analyzer from configuration.
    ///
    /// Validates the configuration, loads the lexicon and constructs the
    /// configured backend. This is the only step that can fail.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let lexicon = Arc::new(Lexicon::load(&config.analysis)?);
        let backend = build_backend(config)?;

        info!(
            backend = %config.backend.kind,
            deep_enabled = config.analysis.deep_enabled,
            "Content analyzer ready"
        );

        Ok(Self::with_backend(
            lexicon,
            PipelineSettings::from_config(config),
            backend,
        ))
    }

    /// Assemble an analyzer from parts.
    pub fn with_backend(
        lexicon: Arc<Lexicon>,
        settings: PipelineSettings,
        backend: Option<Arc<dyn ModelBackend>>,
    ) -> Self {
        Self {
            basic: BasicAnalyzer::new(lexicon.clone(), settings.basic.clone()),
            enhanced: EnhancedAnalyzer::new(lexicon, settings.enhanced.clone()),
            backend,
            settings,
        }
    }

    /// Name of the configured backend, if any.
    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_ref().map(|b| b.name())
    }

    /// Analyze one text unit.
    pub async fn analyze(&self, text: &str) -> AnalysisPair {
        self.analyze_detailed(text).await.pair
    }

    /// Analyze one text unit and report which deep route was taken.
    pub async fn analyze_detailed(&self, text: &str) -> PipelineRun {
        let basic = self.basic.analyze(text);
        debug!(
            score = basic.sentiment.score,
            label = %basic.sentiment.label,
            flagged = basic.is_flagged,
            "Quick analysis done"
        );

        if !self.settings.deep_enabled || text.trim().is_empty() {
            debug!(route = %DeepRoute::Skipped, "Deep analysis skipped");
            return PipelineRun {
                pair: AnalysisPair {
                    basic,
                    enriched: EnrichedResult::neutral(),
                },
                route: DeepRoute::Skipped,
            };
        }

        let local = self.enhanced.analyze(text);
        let chars = text.chars().count();

        let (candidate, route) = match &self.backend {
            Some(backend) if chars > self.settings.min_length_for_external => {
                debug!(
                    backend = backend.name(),
                    chars,
                    "Consulting external backend"
                );
                (
                    backend.analyze_external(text, &local).await,
                    DeepRoute::External,
                )
            }
            _ => (local, DeepRoute::Local),
        };

        let enriched = normalize(candidate.into(), text, &self.settings.normalizer);
        debug!(
            route = %route,
            sentiment = %enriched.sentiment,
            status = ?enriched.api_status,
            "Deep analysis done"
        );

        PipelineRun {
            pair: AnalysisPair { basic, enriched },
            route,
        }
    }

    /// Analyze independent text units concurrently; results keep input order.
    pub async fn analyze_batch<S>(&self, texts: &[S]) -> Vec<AnalysisPair>
    where
        S: AsRef<str>,
    {
        join_all(texts.iter().map(|text| self.analyze(text.as_ref()))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ApiStatus, ContextLabel, Sentiment};

    fn local_only() -> ContentAnalyzer {
        ContentAnalyzer::with_backend(
            Arc::new(Lexicon::builtin().unwrap()),
            PipelineSettings::default(),
            None,
        )
    }

    #[tokio::test]
    async fn test_empty_text_defaults() {
        let run = local_only().analyze_detailed("").await;
        assert_eq!(run.route, DeepRoute::Skipped);
        assert_eq!(run.pair.basic.sentiment.score, 0.0);
        assert_eq!(run.pair.basic.context_label, ContextLabel::Neutral);
        assert!(!run.pair.basic.is_flagged);
        assert_eq!(run.pair.enriched, EnrichedResult::neutral());
    }

    #[tokio::test]
    async fn test_local_route_without_backend() {
        let analyzer = local_only();
        let text = "Great news everyone, the scan is clear and I feel wonderful";
        let run = analyzer.analyze_detailed(text).await;

        assert_eq!(run.route, DeepRoute::Local);
        assert_eq!(run.pair.basic.context_label, ContextLabel::GoodNews);
        assert_eq!(run.pair.enriched.sentiment, Sentiment::Positive);
        assert_eq!(run.pair.enriched.api_status, ApiStatus::Success);
    }

    #[tokio::test]
    async fn test_deep_disabled_skips() {
        let settings = PipelineSettings {
            deep_enabled: false,
            ..PipelineSettings::default()
        };
        let analyzer =
            ContentAnalyzer::with_backend(Arc::new(Lexicon::builtin().unwrap()), settings, None);
        let run = analyzer.analyze_detailed("I love this").await;
        assert_eq!(run.route, DeepRoute::Skipped);
        assert_eq!(run.pair.enriched, EnrichedResult::neutral());
        assert_eq!(run.pair.basic.sentiment.label, Sentiment::Positive);
    }

    #[tokio::test]
    async fn test_batch_keeps_order() {
        let analyzer = local_only();
        let texts = ["I love this", "", "I hate this"];
        let pairs = analyzer.analyze_batch(&texts).await;
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].basic.sentiment.label, Sentiment::Positive);
        assert_eq!(pairs[1].enriched, EnrichedResult::neutral());
        assert_eq!(pairs[2].basic.sentiment.label, Sentiment::Negative);
        assert!(pairs[2].basic.is_flagged);
    }

    #[test]
    fn test_from_config_local_only() {
        let analyzer = ContentAnalyzer::from_config(&Config::default()).unwrap();
        assert!(analyzer.backend_name().is_none());
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let mut config = Config::default();
        config.analysis.max_topics = 0;
        let err = ContentAnalyzer::from_config(&config).err().unwrap();
        assert!(err.is_config());
    }
}

//! Integration tests for external backend failover.
//!
//! Drives the full pipeline with mock completion clients to verify that a
//! failing, slow or misbehaving model never corrupts the deep result.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;

use vibe_analysis::{
    ApiStatus, BackendError, BackendSettings, CompletionClient, ContentAnalyzer, DeepRoute,
    EnhancedAnalyzer, GenerationParams, HeuristicBackend, Lexicon, ModelBackend,
    NormalizerPolicy, PipelineSettings, Sentiment, StrictBackend,
};

const LONG_TEXT: &str = "Just got back from the hospital. The doctors said the treatment is \
    working and the latest scan looks clear, so we are all feeling hopeful tonight.";

// ============================================================================
// Mock Clients for Testing
// ============================================================================

#[derive(Clone, Copy)]
enum Behavior {
    Reply(&'static str),
    Fail,
    Hang,
}

/// Mock client with a fixed behavior and a call counter
struct MockClient {
    behavior: Behavior,
    calls: AtomicU32,
}

impl MockClient {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicU32::new(0),
        })
    }

    fn call_count(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CompletionClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _params: &GenerationParams,
    ) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match self.behavior {
            Behavior::Reply(reply) => Ok(reply.to_string()),
            Behavior::Fail => Err(BackendError::Transport("mock connection refused".into())),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok("too late".into())
            }
        }
    }
}

/// Built once per test binary; the dictionary is large.
fn lexicon() -> Arc<Lexicon> {
    static LEXICON: OnceLock<Arc<Lexicon>> = OnceLock::new();
    LEXICON
        .get_or_init(|| Arc::new(Lexicon::builtin().unwrap()))
        .clone()
}

fn backend_settings() -> BackendSettings {
    BackendSettings {
        timeout: Duration::from_millis(100),
        policy: NormalizerPolicy::default(),
    }
}

fn strict(client: Arc<MockClient>) -> Arc<dyn ModelBackend> {
    Arc::new(StrictBackend::new(client, backend_settings()))
}

fn heuristic(client: Arc<MockClient>) -> Arc<dyn ModelBackend> {
    Arc::new(HeuristicBackend::new(client, backend_settings()))
}

fn analyzer(backend: Arc<dyn ModelBackend>) -> ContentAnalyzer {
    ContentAnalyzer::with_backend(lexicon(), PipelineSettings::default(), Some(backend))
}

fn enhanced(text: &str) -> vibe_analysis::EnrichedResult {
    EnhancedAnalyzer::new(lexicon(), PipelineSettings::default().enhanced).analyze(text)
}

// ============================================================================
// Strict backend
// ============================================================================

#[tokio::test]
async fn test_strict_transport_failure_uses_local_with_failure() {
    let client = MockClient::new(Behavior::Fail);
    let analyzer = analyzer(strict(client.clone()));

    let run = analyzer.analyze_detailed(LONG_TEXT).await;

    assert_eq!(run.route, DeepRoute::External);
    assert_eq!(
        run.pair.enriched,
        enhanced(LONG_TEXT).with_status(ApiStatus::Failure)
    );
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_strict_non_json_reply_uses_local_with_failure() {
    let client = MockClient::new(Behavior::Reply("The sentiment is positive!"));
    let analyzer = analyzer(strict(client.clone()));

    let pair = analyzer.analyze(LONG_TEXT).await;

    assert_eq!(pair.enriched.api_status, ApiStatus::Failure);
    assert_eq!(pair.enriched, enhanced(LONG_TEXT).with_status(ApiStatus::Failure));
}

#[tokio::test]
async fn test_strict_timeout_uses_local_with_failure() {
    let client = MockClient::new(Behavior::Hang);
    let analyzer = analyzer(strict(client.clone()));

    let started = std::time::Instant::now();
    let pair = analyzer.analyze(LONG_TEXT).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(pair.enriched, enhanced(LONG_TEXT).with_status(ApiStatus::Failure));
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_strict_valid_reply_wins() {
    let client = MockClient::new(Behavior::Reply(
        r#"{"sentiment": "positive", "sentiment_score": 0.9, "topics": ["treatment", "hope"], "content_warnings": [], "summary": "Treatment is working."}"#,
    ));
    let analyzer = analyzer(strict(client.clone()));

    let pair = analyzer.analyze(LONG_TEXT).await;

    assert_eq!(pair.enriched.sentiment, Sentiment::Positive);
    assert_eq!(pair.enriched.sentiment_score, 0.9);
    assert_eq!(pair.enriched.topics, vec!["treatment", "hope"]);
    assert_eq!(pair.enriched.summary, "Treatment is working.");
    assert_eq!(pair.enriched.api_status, ApiStatus::Success);
}

// ============================================================================
// Heuristic backend
// ============================================================================

#[tokio::test]
async fn test_heuristic_failure_uses_local_with_success() {
    let client = MockClient::new(Behavior::Fail);
    let analyzer = analyzer(heuristic(client.clone()));

    let pair = analyzer.analyze(LONG_TEXT).await;

    assert_eq!(pair.enriched, enhanced(LONG_TEXT));
    assert_eq!(pair.enriched.api_status, ApiStatus::Success);
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_heuristic_garbage_reply_uses_local_with_success() {
    let client = MockClient::new(Behavior::Reply("<think>...</think> no idea"));
    let analyzer = analyzer(heuristic(client));

    let pair = analyzer.analyze(LONG_TEXT).await;

    assert_eq!(pair.enriched, enhanced(LONG_TEXT));
}

#[tokio::test]
async fn test_heuristic_timeout_uses_local_with_success() {
    let client = MockClient::new(Behavior::Hang);
    let analyzer = analyzer(heuristic(client));

    let pair = analyzer.analyze(LONG_TEXT).await;

    assert_eq!(pair.enriched, enhanced(LONG_TEXT));
}

#[tokio::test]
async fn test_heuristic_merges_reply() {
    let client = MockClient::new(Behavior::Reply(
        r#"{"sentiment": "extremely positive", "content_warnings": ["medical"]}"#,
    ));
    let analyzer = analyzer(heuristic(client));

    let pair = analyzer.analyze(LONG_TEXT).await;
    let local = enhanced(LONG_TEXT);

    assert_eq!(pair.enriched.sentiment, Sentiment::Positive);
    assert_eq!(pair.enriched.content_warnings, vec!["medical"]);
    assert_eq!(pair.enriched.topics, local.topics);
    assert_eq!(pair.enriched.summary, local.summary);
    assert_eq!(pair.enriched.sentiment_score, local.sentiment_score);
}

// ============================================================================
// Eligibility
// ============================================================================

#[tokio::test]
async fn test_short_text_never_calls_backend() {
    let client = MockClient::new(Behavior::Reply("{}"));
    let analyzer = analyzer(strict(client.clone()));

    let text = "Short and sweet, feeling great today";
    let run = analyzer.analyze_detailed(text).await;

    assert_eq!(run.route, DeepRoute::Local);
    assert_eq!(run.pair.enriched, enhanced(text));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_length_boundary_is_exclusive() {
    let client = MockClient::new(Behavior::Fail);
    let analyzer = analyzer(strict(client.clone()));

    let exactly = "a".repeat(100);
    analyzer.analyze(&exactly).await;
    assert_eq!(client.call_count(), 0);

    let longer = "a".repeat(101);
    analyzer.analyze(&longer).await;
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_length_counts_characters_not_bytes() {
    let client = MockClient::new(Behavior::Fail);
    let analyzer = analyzer(strict(client.clone()));

    // 60 characters, 120 bytes
    let text = "é".repeat(60);
    analyzer.analyze(&text).await;
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_empty_text_never_calls_backend() {
    let client = MockClient::new(Behavior::Fail);
    let analyzer = analyzer(strict(client.clone()));

    let run = analyzer.analyze_detailed("   ").await;

    assert_eq!(run.route, DeepRoute::Skipped);
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_batch_calls_backend_once_per_eligible_text() {
    let client = MockClient::new(Behavior::Fail);
    let analyzer = analyzer(heuristic(client.clone()));

    let texts = [LONG_TEXT, "short", "", LONG_TEXT];
    let pairs = analyzer.analyze_batch(&texts).await;

    assert_eq!(pairs.len(), 4);
    assert_eq!(client.call_count(), 2);
    assert_eq!(pairs[0], pairs[3]);
}

//! Vibe Analysis Library
//!
//! Two-tier content analysis for short social posts and comments.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                      ContentAnalyzer (pipeline)                   │
//! ├───────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐   ┌──────────────┐   ┌───────────────────────┐  │
//! │  │ BasicAnalyzer│   │  Enhanced    │──▶│ ModelBackend          │  │
//! │  │ (quick tier) │   │  Analyzer    │   │ strict │ heuristic    │  │
//! │  └──────┬───────┘   └──────┬───────┘   └──────────┬────────────┘  │
//! │         │                  └──────────┬───────────┘               │
//! │         │                        Normalizer                       │
//! │         ▼                             ▼                           │
//! │    basicAnalysis                 llmAnalysis                      │
//! └───────────────────────────────────────────────────────────────────┘
//!                      shared: Arc<Lexicon>
//! ```
//!
//! # Guarantees
//!
//! - The quick tier never fails and never leaves the process.
//! - The deep tier always yields a schema-conformant result; external model
//!   failures degrade to the local result.
//! - Only construction ([`ContentAnalyzer::from_config`]) returns errors.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod backend;
pub mod basic;
pub mod enhanced;
pub mod lexicon;
pub mod normalizer;
pub mod pipeline;
pub mod types;

pub use backend::{
    build_backend, BackendError, BackendSettings, CompletionClient, GeminiClient,
    GenerationParams, HeuristicBackend, ModelBackend, OllamaClient, StrictBackend,
};
pub use basic::{BasicAnalyzer, BasicPolicy};
pub use enhanced::{EnhancedAnalyzer, EnhancedPolicy};
pub use lexicon::{Lexicon, Preprocessor};
pub use normalizer::{normalize, NormalizerPolicy};
pub use pipeline::{ContentAnalyzer, PipelineSettings};
pub use types::{
    AnalysisPair, ApiStatus, CandidateResult, ContextLabel, DeepRoute, EnrichedResult,
    ParseOutcome, PipelineRun, QuickResult, QuickSentiment, Sentiment, NO_SUMMARY,
};

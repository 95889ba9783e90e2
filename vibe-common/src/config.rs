//! Configuration management for Vibe services.
//!
//! The analysis service reads a single configuration file at `~/.vibe/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (VIBE_* prefix, provider keys)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `VIBE_BACKEND` → backend.kind (`strict`, `heuristic`, `none`)
//! - `VIBE_TIMEOUT_MS` → backend.timeout_ms
//! - `VIBE_MIN_LENGTH_FOR_EXTERNAL` → backend.min_length_for_external
//! - `VIBE_DEEP_ENABLED` → analysis.deep_enabled
//! - `VIBE_LOG_LEVEL` / `VIBE_LOG_FORMAT` → observability.*
//! - `GEMINI_API_KEY` / `GOOGLE_API_KEY` → backend.gemini.api_key
//! - `OLLAMA_BASE_URL` → backend.ollama.base_url

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".vibe"),
        |dirs| dirs.home_dir().join(".vibe"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration for the analysis service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Local analysis policy (thresholds, keyword lists, lexicon)
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// External model backend selection and endpoints
    #[serde(default)]
    pub backend: BackendConfig,

    /// Logging configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration from `path`, or the default location when `None`,
    /// then apply environment variable overrides.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Unparseable values are ignored and the current value is kept.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(kind) = lookup("VIBE_BACKEND") {
            match kind.parse() {
                Ok(kind) => self.backend.kind = kind,
                Err(e) => tracing::warn!(error = %e, "Ignoring VIBE_BACKEND override"),
            }
        }
        if let Some(ms) = lookup("VIBE_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.backend.timeout_ms = ms;
        }
        if let Some(len) = lookup("VIBE_MIN_LENGTH_FOR_EXTERNAL").and_then(|v| v.parse().ok()) {
            self.backend.min_length_for_external = len;
        }
        if let Some(enabled) = lookup("VIBE_DEEP_ENABLED").and_then(|v| parse_bool(&v)) {
            self.analysis.deep_enabled = enabled;
        }

        if let Some(level) = lookup("VIBE_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("VIBE_LOG_FORMAT") {
            self.observability.log_format = format;
        }

        if let Some(key) = lookup("GEMINI_API_KEY").or_else(|| lookup("GOOGLE_API_KEY")) {
            self.backend.gemini.api_key = Some(key);
        }
        if let Some(url) = lookup("OLLAMA_BASE_URL") {
            self.backend.ollama.base_url = url;
        }
    }

    /// A copy of this configuration that is safe to print.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.backend.gemini.api_key.is_some() {
            copy.backend.gemini.api_key = Some("***".into());
        }
        copy
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ============================================================================
// Analysis Configuration
// ============================================================================

/// Local analysis policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Run the deep tier at all
    #[serde(default = "default_true")]
    pub deep_enabled: bool,

    /// Scores above `+threshold` are positive, below `-threshold` negative
    #[serde(default = "default_sentiment_threshold")]
    pub sentiment_threshold: f64,

    /// Maximum number of topics kept on an enriched result
    #[serde(default = "default_max_topics")]
    pub max_topics: usize,

    /// Tokens must be strictly longer than this to count as topics
    #[serde(default = "default_min_topic_length")]
    pub min_topic_length: usize,

    /// Number of filtered tokens joined into the local summary
    #[serde(default = "default_summary_tokens")]
    pub summary_tokens: usize,

    /// Length of the source excerpt used when a summary is missing
    #[serde(default = "default_fallback_summary_chars")]
    pub fallback_summary_chars: usize,

    /// Blend weights for the two local scorers
    #[serde(default)]
    pub local_weights: LocalWeights,

    /// Spelling correction in the quick tier
    #[serde(default = "default_true")]
    pub spelling_correction: bool,

    /// Optional word-frequency dictionary replacing the built-in one
    #[serde(default)]
    pub dictionary_path: Option<PathBuf>,

    /// Keyword lists
    #[serde(default)]
    pub keywords: KeywordConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            deep_enabled: true,
            sentiment_threshold: default_sentiment_threshold(),
            max_topics: default_max_topics(),
            min_topic_length: default_min_topic_length(),
            summary_tokens: default_summary_tokens(),
            fallback_summary_chars: default_fallback_summary_chars(),
            local_weights: LocalWeights::default(),
            spelling_correction: true,
            dictionary_path: None,
            keywords: KeywordConfig::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sentiment_threshold() -> f64 {
    0.1
}

fn default_max_topics() -> usize {
    3
}

fn default_min_topic_length() -> usize {
    3
}

fn default_summary_tokens() -> usize {
    10
}

fn default_fallback_summary_chars() -> usize {
    100
}

/// Weights of the general lexicon scorer and the polarity scorer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LocalWeights {
    #[serde(default = "default_half")]
    pub general: f64,
    #[serde(default = "default_half")]
    pub polarity: f64,
}

impl Default for LocalWeights {
    fn default() -> Self {
        Self {
            general: 0.5,
            polarity: 0.5,
        }
    }
}

fn default_half() -> f64 {
    0.5
}

/// Keyword lists used by the local tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordConfig {
    /// Positive posts mentioning one of these are `good_news`
    #[serde(default = "default_good_news")]
    pub good_news: Vec<String>,

    /// Negative posts mentioning one of these are `bad_news`
    #[serde(default = "default_bad_news")]
    pub bad_news: Vec<String>,

    /// Any occurrence flags the content
    #[serde(default = "default_forbidden")]
    pub forbidden: Vec<String>,

    /// Tokens that produce a content warning in the deep tier
    #[serde(default = "default_sensitive")]
    pub sensitive: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            good_news: default_good_news(),
            bad_news: default_bad_news(),
            forbidden: default_forbidden(),
            sensitive: default_sensitive(),
        }
    }
}

fn strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

fn default_good_news() -> Vec<String> {
    strings(&[
        "remission",
        "clear",
        "negative",
        "recovered",
        "stable",
        "improving",
        "good news",
    ])
}

fn default_bad_news() -> Vec<String> {
    strings(&[
        "diagnosis",
        "diagnosed",
        "relapse",
        "recurrence",
        "metastasis",
        "struggling",
        "worsening",
        "bad news",
    ])
}

fn default_forbidden() -> Vec<String> {
    strings(&["kill", "attack", "hate", "stupid"])
}

fn default_sensitive() -> Vec<String> {
    strings(&["hate", "violence", "threat", "harm", "abuse", "death", "kill"])
}

// ============================================================================
// Backend Configuration
// ============================================================================

/// Which external model backend enriches the deep tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Strict JSON contract; fallbacks are reported as `Failure`
    Strict,
    /// Best-effort merge with the local result; fallbacks stay `Success`
    Heuristic,
    /// Local analysis only
    #[default]
    None,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Heuristic => write!(f, "heuristic"),
            Self::None => write!(f, "none"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" | "gemini" => Ok(Self::Strict),
            "heuristic" | "ollama" => Ok(Self::Heuristic),
            "none" | "off" | "" => Ok(Self::None),
            other => Err(format!("unknown backend kind '{other}'")),
        }
    }
}

/// External backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend variant
    #[serde(default)]
    pub kind: BackendKind,

    /// Bound on the single outbound request, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Texts must be longer than this (in characters) to reach the backend
    #[serde(default = "default_min_length_for_external")]
    pub min_length_for_external: usize,

    /// Strict backend endpoint
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Heuristic backend endpoint
    #[serde(default)]
    pub ollama: OllamaConfig,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::None,
            timeout_ms: default_timeout_ms(),
            min_length_for_external: default_min_length_for_external(),
            gemini: GeminiConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

impl BackendConfig {
    /// The request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_min_length_for_external() -> usize {
    100
}

/// Gemini (strict backend) endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API base URL
    #[serde(default = "default_gemini_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API key
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_url(),
            model: default_gemini_model(),
            api_key: None,
        }
    }
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".into()
}

/// Ollama (heuristic backend) endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama API base URL
    #[serde(default = "default_ollama_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_ollama_model(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".into()
}

fn default_ollama_model() -> String {
    "deepseek-r1".into()
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Tests
// ============================================================================

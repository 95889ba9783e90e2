//! Vibe Common - Shared configuration, errors, and logging for the Vibe services.
//!
//! This crate provides:
//! - Configuration types and loading
//! - Configuration validation
//! - Error types and handling utilities
//! - Logging setup

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod validation;

pub use config::{
    AnalysisConfig, BackendConfig, BackendKind, Config, GeminiConfig, KeywordConfig,
    LocalWeights, ObservabilityConfig, OllamaConfig,
};
pub use error::{Error, Result, ResultExt};
pub use validation::{Validate, ValidationError, ValidationResult};

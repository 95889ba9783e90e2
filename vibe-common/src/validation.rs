//! Configuration validation for Vibe services.
//!
//! Checks that thresholds are in range and that the selected backend has
//! what it needs before any analysis runs.

use std::path::Path;

use thiserror::Error;

use crate::config::{AnalysisConfig, BackendConfig, BackendKind, Config, ObservabilityConfig};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

impl Config {
    /// Validate the entire configuration.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = self.analysis.validate() {
            errors.push(e);
        }

        if let Err(e) = self.backend.validate() {
            errors.push(e);
        }

        if let Err(e) = self.observability.validate() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else if errors.len() == 1 {
            Err(errors.remove(0))
        } else {
            Err(ValidationError::Multiple(errors))
        }
    }

    /// Load, apply environment overrides, and validate configuration.
    pub fn load_and_validate(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = Self::load_with_env(path)?;
        config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok(config)
    }
}

impl Validate for AnalysisConfig {
    fn validate(&self) -> ValidationResult<()> {
        if !(0.0..1.0).contains(&self.sentiment_threshold) {
            return Err(ValidationError::InvalidValue {
                field: "analysis.sentiment_threshold".into(),
                reason: "must be in [0, 1)".into(),
            });
        }

        if self.max_topics == 0 {
            return Err(ValidationError::InvalidValue {
                field: "analysis.max_topics".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.summary_tokens == 0 {
            return Err(ValidationError::InvalidValue {
                field: "analysis.summary_tokens".into(),
                reason: "must be greater than 0".into(),
            });
        }

        let weights = self.local_weights;
        if weights.general < 0.0 || weights.polarity < 0.0 || weights.general + weights.polarity <= 0.0
        {
            return Err(ValidationError::InvalidValue {
                field: "analysis.local_weights".into(),
                reason: "weights must be non-negative and not both zero".into(),
            });
        }

        Ok(())
    }
}

impl Validate for BackendConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.timeout_ms == 0 {
            return Err(ValidationError::InvalidValue {
                field: "backend.timeout_ms".into(),
                reason: "must be greater than 0".into(),
            });
        }

        match self.kind {
            BackendKind::Strict => {
                if self.gemini.base_url.trim().is_empty() {
                    return Err(ValidationError::MissingField {
                        field: "backend.gemini.base_url".into(),
                    });
                }
                if self.gemini.api_key.as_deref().map_or(true, str::is_empty) {
                    return Err(ValidationError::MissingField {
                        field: "backend.gemini.api_key".into(),
                    });
                }
            }
            BackendKind::Heuristic => {
                if self.ollama.base_url.trim().is_empty() {
                    return Err(ValidationError::MissingField {
                        field: "backend.ollama.base_url".into(),
                    });
                }
            }
            BackendKind::None => {}
        }

        Ok(())
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            });
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.log_format.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let mut config = Config::default();
        config.analysis.sentiment_threshold = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sentiment_threshold"));
    }

    #[test]
    fn test_zero_weights_rejected() {
        let mut config = Config::default();
        config.analysis.local_weights.general = 0.0;
        config.analysis.local_weights.polarity = 0.0;
        assert!(config.analysis.validate().is_err());
    }

    #[test]
    fn test_strict_backend_requires_api_key() {
        let mut config = Config::default();
        config.backend.kind = BackendKind::Strict;
        assert!(matches!(
            config.backend.validate(),
            Err(ValidationError::MissingField { .. })
        ));

        config.backend.gemini.api_key = Some("key".into());
        assert!(config.backend.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.backend.timeout_ms = 0;
        assert!(config.backend.validate().is_err());
    }

    #[test]
    fn test_load_and_validate_rejects_invalid_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"analysis": {{"max_topics": 0}}}}"#).unwrap();
        let err = Config::load_and_validate(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("max_topics"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"analysis": {{"max_topics": 2}}}}"#).unwrap();
        let config = Config::load_and_validate(Some(file.path())).unwrap();
        assert_eq!(config.analysis.max_topics, 2);
    }

    #[test]
    fn test_multiple_errors_collected() {
        let mut config = Config::default();
        config.analysis.max_topics = 0;
        config.observability.log_level = "loud".into();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::Multiple(errors)) if errors.len() == 2
        ));
    }
}

//! Error types for the Vibe services.

use thiserror::Error;

/// Result type alias using the Vibe error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Vibe services.
///
/// Per-request analysis never produces one of these; they only surface while
/// building the analyzer (configuration, lexicon resources, HTTP clients).
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// External service error
    #[error("External service error: {0}")]
    External(String),

    /// Other error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an error with additional context.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Check if this is a configuration error, looking through context.
    pub fn is_config(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::WithContext { source, .. } => source.is_config(),
            _ => false,
        }
    }
}

impl From<crate::validation::ValidationError> for Error {
    fn from(err: crate::validation::ValidationError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Extension trait for adding context to any error type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;

    #[test]
    fn test_error_with_context() {
        let err = Error::Config("missing dictionary".into());
        let with_ctx = err.with_context("loading lexicon");
        assert!(matches!(with_ctx, Error::WithContext { .. }));
        assert!(with_ctx.is_config());
        assert_eq!(
            with_ctx.to_string(),
            "loading lexicon: Configuration error: missing dictionary"
        );
    }

    #[test]
    fn test_result_ext_converts_validation_errors() {
        let result: std::result::Result<(), ValidationError> = Err(ValidationError::MissingField {
            field: "backend.gemini.api_key".into(),
        });
        let err = result.context("building strict backend").unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().starts_with("building strict backend: "));
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn test_external_is_not_config() {
        let err = Error::External("tls backend unavailable".into()).with_context("http client");
        assert!(!err.is_config());
    }
}

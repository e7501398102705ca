//! Unified Error Type System
//!
//! Centralized error types for the crate.
//!
//! ## Error Families
//!
//! - **GuardError**: infrastructure failures (I/O, HTTP, config, timeouts)
//! - **ParseError**: every recovery tier failed on a model response
//! - **GenerationError**: a single generation attempt cannot produce an itinerary
//!
//! Per-destination weather failures and cost parse failures are not errors at
//! all: they degrade to `None` summaries and `0` respectively.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use super::ParseTier;

// =============================================================================
// Parse Error
// =============================================================================

/// All recovery tiers were exhausted for a piece of model output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Length of the original text in bytes
    pub text_len: usize,
    /// Tiers attempted, in order
    pub tiers_tried: Vec<ParseTier>,
    /// Failure reason from the last tier attempted
    pub reason: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tiers: Vec<&str> = self.tiers_tried.iter().map(|t| t.as_str()).collect();
        write!(
            f,
            "unparseable model output ({} bytes, tried: {}): {}",
            self.text_len,
            tiers.join(" -> "),
            self.reason
        )
    }
}

impl std::error::Error for ParseError {}

// =============================================================================
// Generation Error
// =============================================================================

/// Fatal outcome of one generation attempt
///
/// The caller owns retry policy: an `Unparseable` result usually means
/// re-prompting the model, an `InvalidRequest` never does.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Unparseable(ParseError),

    #[error("Model output parsed to {found}, expected a JSON object")]
    UnexpectedShape { found: String },

    #[error("Invalid generation request: {0}")]
    InvalidRequest(String),
}

impl GenerationError {
    /// Stable machine-readable kind for log entries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unparseable(_) => "unparseable",
            Self::UnexpectedShape { .. } => "unexpected_shape",
            Self::InvalidRequest(_) => "invalid_request",
        }
    }

    /// Whether re-invoking the model could plausibly fix this failure
    pub fn should_reprompt(&self) -> bool {
        matches!(self, Self::Unparseable(_) | Self::UnexpectedShape { .. })
    }
}

impl From<ParseError> for GenerationError {
    fn from(err: ParseError) -> Self {
        GenerationError::Unparseable(err)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum GuardError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // -------------------------------------------------------------------------
    // Provider Errors
    // -------------------------------------------------------------------------
    /// A weather collaborator answered, but not usefully
    #[error("Provider {provider} failed: {message}")]
    Provider { provider: String, message: String },

    /// Operation timeout with context
    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl From<ParseError> for GuardError {
    fn from(err: ParseError) -> Self {
        GuardError::Generation(GenerationError::Unparseable(err))
    }
}

pub type Result<T> = std::result::Result<T, GuardError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl GuardError {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a provider error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Transient failures a caller may retry on its own schedule
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Provider { .. } => true,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError {
            text_len: 42,
            tiers_tried: vec![ParseTier::Strict, ParseTier::Lenient],
            reason: "expected value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unparseable model output (42 bytes, tried: strict -> lenient): expected value"
        );
    }

    #[test]
    fn test_generation_error_kind() {
        let err = GenerationError::InvalidRequest("no destinations".to_string());
        assert_eq!(err.kind(), "invalid_request");
        assert!(!err.should_reprompt());

        let err: GenerationError = ParseError {
            text_len: 0,
            tiers_tried: vec![ParseTier::Strict],
            reason: "empty".to_string(),
        }
        .into();
        assert_eq!(err.kind(), "unparseable");
        assert!(err.should_reprompt());
    }

    #[test]
    fn test_guard_error_transient() {
        assert!(GuardError::timeout("geocode", Duration::from_secs(1)).is_transient());
        assert!(GuardError::provider("open-meteo", "HTTP 503").is_transient());
        assert!(!GuardError::Config("bad".to_string()).is_transient());
    }

    #[test]
    fn test_parse_error_converts_to_guard_error() {
        let err: GuardError = ParseError {
            text_len: 3,
            tiers_tried: vec![],
            reason: "nope".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            GuardError::Generation(GenerationError::Unparseable(_))
        ));
    }
}

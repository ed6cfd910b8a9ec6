//! Error types for AskKAI
//!
//! One taxonomy for the whole pipeline: external service failures, malformed
//! responses, and local validation problems, plus wrappers for the
//! lower-level errors they are built from.

use thiserror::Error;

/// Main error type for the assistant
#[derive(Error, Debug)]
pub enum KaiError {
    /// Search or completion call failed (network, auth, non-2xx status)
    #[error("{service} service error: {message}")]
    ExternalService { service: String, message: String },

    /// Response body did not have the expected structure
    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    /// Local input violates a precondition
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Login failed (unknown user or wrong password)
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Timeout errors
    #[error("{service} request timed out after {duration_ms}ms")]
    Timeout { service: String, duration_ms: u64 },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, KaiError>;

impl KaiError {
    pub fn external(service: &str, message: impl Into<String>) -> Self {
        KaiError::ExternalService {
            service: service.to_string(),
            message: message.into(),
        }
    }

    pub fn parse(what: &str, message: impl Into<String>) -> Self {
        KaiError::Parse {
            what: what.to_string(),
            message: message.into(),
        }
    }

    /// Map a failed HTTP send onto the taxonomy; elapsed deadlines become `Timeout`
    pub fn from_send(service: &str, err: reqwest::Error, timeout: std::time::Duration) -> Self {
        if err.is_timeout() {
            KaiError::Timeout {
                service: service.to_string(),
                duration_ms: timeout.as_millis() as u64,
            }
        } else {
            KaiError::external(service, format!("Failed to send request: {}", err))
        }
    }

    /// True for failures caused by a remote service rather than local input
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            KaiError::ExternalService { .. }
                | KaiError::Timeout { .. }
                | KaiError::Http(_)
                | KaiError::Parse { .. }
        )
    }
}

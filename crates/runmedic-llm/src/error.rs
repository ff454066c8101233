//! Error types for the generative client.

use thiserror::Error;

/// Result type alias using the LLM error type.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Error type for generative API operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The API answered with a status other than 200.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Network/connectivity error.
    #[error("Network error: {0}")]
    Network(String),

    /// Configuration error (API key missing, bad URL, etc.).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The body could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LlmError {
    /// HTTP status, if the API answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            LlmError::Network(format!("Connection failed: {}", err))
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accessor() {
        let err = LlmError::Status {
            status: 429,
            body: "quota".to_string(),
        };
        assert_eq!(err.status(), Some(429));
        assert_eq!(err.to_string(), "HTTP 429: quota");
        assert!(LlmError::Network("x".into()).status().is_none());
    }
}

//! Resource client error types.

use thiserror::Error;

/// Error type for resource-management calls.
///
/// Cloneable so that the outcome of a call can be journaled and replayed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// The API answered with a non-success status.
    #[error("{status} error from resource API: {body}")]
    Upstream { status: u16, body: String },

    /// The request never produced a response (connect, timeout, TLS).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body did not match the expected schema.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// A URL could not be built from the target or base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ResourceError {
    /// HTTP status of an upstream failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ResourceError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure is worth retrying: transport errors, 5xx and 429.
    pub fn is_transient(&self) -> bool {
        match self {
            ResourceError::Transport(_) => true,
            ResourceError::Upstream { status, .. } => *status >= 500 || *status == 429,
            ResourceError::Decode(_) | ResourceError::InvalidUrl(_) => false,
        }
    }
}

impl From<reqwest::Error> for ResourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ResourceError::Transport(format!("request timed out: {}", e))
        } else if e.is_connect() {
            ResourceError::Transport(format!("connection failed: {}", e))
        } else if e.is_decode() {
            ResourceError::Decode(e.to_string())
        } else {
            ResourceError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ResourceError {
    fn from(e: serde_json::Error) -> Self {
        ResourceError::Decode(e.to_string())
    }
}

impl From<url::ParseError> for ResourceError {
    fn from(e: url::ParseError) -> Self {
        ResourceError::InvalidUrl(e.to_string())
    }
}

/// Result type for resource operations.
pub type Result<T> = std::result::Result<T, ResourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let upstream = |status| ResourceError::Upstream {
            status,
            body: String::new(),
        };
        assert!(upstream(500).is_transient());
        assert!(upstream(503).is_transient());
        assert!(upstream(429).is_transient());
        assert!(!upstream(400).is_transient());
        assert!(!upstream(401).is_transient());
        assert!(!upstream(404).is_transient());
        assert!(ResourceError::Transport("reset".into()).is_transient());
        assert!(!ResourceError::Decode("eof".into()).is_transient());
    }

    #[test]
    fn test_display_includes_status() {
        let err = ResourceError::Upstream {
            status: 403,
            body: "AuthorizationFailed".into(),
        };
        assert_eq!(err.to_string(), "403 error from resource API: AuthorizationFailed");
        assert_eq!(err.status(), Some(403));
    }
}

//! Error types for the server.
//!
//! Error bodies are plain text so callers see the same strings the
//! inspection service has always returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use runmedic_pipeline::{OrchestrationError, PipelineError, REMEDIATION_FAILED_MESSAGE};
use thiserror::Error;

pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or missing Authorization token.";
pub const MISSING_PARAMETERS_MESSAGE: &str = "Missing required parameters in the request body.";
pub const INVALID_PAYLOAD_MESSAGE: &str = "Invalid JSON payload.";

/// Server error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The request was rejected before any upstream call.
    #[error("{0}")]
    Validation(String),

    /// The resource API failed on a call the inspection cannot continue without.
    #[error("{0}")]
    Upstream(String),

    /// Failures were found but the generative backend gave no fix.
    #[error("{}", REMEDIATION_FAILED_MESSAGE)]
    RemediationUnavailable,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Service unavailable.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn invalid_token() -> Self {
        ServerError::Validation(INVALID_TOKEN_MESSAGE.to_string())
    }

    pub fn missing_parameters() -> Self {
        ServerError::Validation(MISSING_PARAMETERS_MESSAGE.to_string())
    }

    pub fn invalid_payload() -> Self {
        ServerError::Validation(INVALID_PAYLOAD_MESSAGE.to_string())
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Upstream(_)
            | ServerError::RemediationUnavailable
            | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PipelineError> for ServerError {
    fn from(e: PipelineError) -> Self {
        ServerError::Upstream(e.to_string())
    }
}

impl From<OrchestrationError> for ServerError {
    fn from(e: OrchestrationError) -> Self {
        match e {
            OrchestrationError::NotFound(id) => {
                ServerError::NotFound(format!("Orchestration '{}' not found", id))
            }
            other => ServerError::Internal(other.to_string()),
        }
    }
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = %status.as_u16(), error = %message, "Server error");
        } else {
            tracing::warn!(status = %status.as_u16(), error = %message, "Client error");
        }

        (status, message).into_response()
    }
}

//! Error types for the inspection pipeline.

use runmedic_resource::ResourceError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that abort an inspection.
///
/// Per-run action lookup failures never surface here; they only skip the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Listing the workflow's runs failed.
    #[error("API call to get runs failed: {0}")]
    Runs(#[source] ResourceError),

    /// Fetching the workflow details failed.
    #[error("Failed to get workflow details: {0}")]
    Workflow(#[source] ResourceError),
}

impl PipelineError {
    /// The underlying resource error.
    pub fn resource_error(&self) -> &ResourceError {
        match self {
            PipelineError::Runs(e) | PipelineError::Workflow(e) => e,
        }
    }
}

/// Errors raised by the checkpoint stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection or operation failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Requested instance not found.
    #[error("Orchestration not found: {0}")]
    NotFound(String),

    /// A row could not be decoded.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The database file or its directory could not be created.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while driving an orchestration.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// Replay diverged from the journal.
    #[error(
        "Non-deterministic orchestration: checkpoint {sequence} recorded '{recorded}' but replay called '{called}'"
    )]
    NonDeterministic {
        sequence: u32,
        recorded: String,
        called: String,
    },

    /// Checkpoint store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A journaled value could not be encoded or decoded.
    #[error("Checkpoint serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A mandatory activity failed; the orchestration cannot continue.
    #[error("{0}")]
    ActivityFailed(String),

    /// Unknown instance id.
    #[error("Orchestration not found: {0}")]
    NotFound(String),

    /// The instance did not finish in time.
    #[error("Timed out waiting for orchestration {0}")]
    Timeout(String),
}

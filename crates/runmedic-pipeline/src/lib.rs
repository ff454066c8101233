//! Failed workflow-run inspection pipeline.
//!
//! Both drivers share the same extraction and remediation logic:
//!
//! ```text
//! ┌──────────────────┐    ┌──────────────────────┐
//! │ ConcurrentDriver │    │ OrchestrationHost    │
//! │  tokio::join!    │    │  journaled activities│
//! │  buffered lookups│    │  replay on resume    │
//! └────────┬─────────┘    └──────────┬───────────┘
//!          │                         │
//!          ▼                         ▼
//!   extract::FailureCollector  +  remediation::RemediationRequester
//!          │
//!          ▼
//!   outcome::InspectionOutcome
//! ```

pub mod concurrent;
pub mod durable;
pub mod error;
pub mod extract;
pub mod outcome;
pub mod remediation;

pub use concurrent::ConcurrentDriver;
pub use durable::{
    CheckpointStore, InMemoryCheckpointStore, InstanceStatus, InstanceStatusView,
    OrchestrationHost, OrchestrationInput, RetryPolicy, SharedCheckpointStore,
    SqliteCheckpointStore,
};
pub use error::{OrchestrationError, PipelineError, Result, StoreError};
pub use extract::{FailureCollector, extract_failures, failed_runs};
pub use outcome::{
    GoogleResponse, InspectionOutcome, NO_FAILURES_MESSAGE, REMEDIATION_FAILED_MESSAGE,
    RemediationReport, UpdatedCode,
};
pub use remediation::{Remediation, RemediationRequester, build_prompt};

//! Journal entries and orchestration instance records.

use std::fmt;

use chrono::{DateTime, Utc};
use runmedic_resource::ResourceError;
use runmedic_types::{BearerCredential, InspectionTarget};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Activity outcomes
// ─────────────────────────────────────────────────────────────────────────────

/// Failure reported by an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ActivityFailure {
    pub message: String,
    /// Upstream HTTP status, when there was one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Whether the retry policy may try again.
    #[serde(default)]
    pub transient: bool,
}

impl ActivityFailure {
    /// A failure that will not be retried.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            transient: false,
        }
    }

    /// A failure that the retry policy may retry.
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            transient: true,
        }
    }
}

impl From<ResourceError> for ActivityFailure {
    fn from(e: ResourceError) -> Self {
        Self {
            message: e.to_string(),
            status: e.status(),
            transient: e.is_transient(),
        }
    }
}

/// Journaled outcome of one activity invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ActivityOutcome {
    Succeeded { output: Value },
    Failed { error: ActivityFailure },
}

/// One journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Position in the orchestration's activity sequence, from zero.
    pub sequence: u32,
    /// Activity name, checked on replay.
    pub activity: String,
    pub outcome: ActivityOutcome,
    pub recorded_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(sequence: u32, activity: impl Into<String>, outcome: ActivityOutcome) -> Self {
        Self {
            sequence,
            activity: activity.into(),
            outcome,
            recorded_at: Utc::now(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Instances
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle of an orchestration instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstanceStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl InstanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceStatus::Pending => "Pending",
            InstanceStatus::Running => "Running",
            InstanceStatus::Completed => "Completed",
            InstanceStatus::Failed => "Failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(InstanceStatus::Pending),
            "Running" => Some(InstanceStatus::Running),
            "Completed" => Some(InstanceStatus::Completed),
            "Failed" => Some(InstanceStatus::Failed),
            _ => None,
        }
    }

    /// Whether the instance still needs driving.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, InstanceStatus::Pending | InstanceStatus::Running)
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orchestration input. Persisted so the instance can be resumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationInput {
    #[serde(flatten)]
    pub target: InspectionTarget,
    pub bearer_token: BearerCredential,
}

impl OrchestrationInput {
    pub fn new(target: InspectionTarget, bearer_token: BearerCredential) -> Self {
        Self {
            target,
            bearer_token,
        }
    }
}

/// A stored orchestration instance.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestrationInstance {
    pub id: String,
    pub status: InstanceStatus,
    pub input: OrchestrationInput,
    pub output: Option<Value>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrchestrationInstance {
    /// A fresh `Pending` instance.
    pub fn pending(id: impl Into<String>, input: OrchestrationInput) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            status: InstanceStatus::Pending,
            input,
            output: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Public view of the instance. Never includes the credential.
    pub fn status_view(&self) -> InstanceStatusView {
        InstanceStatusView {
            instance_id: self.id.clone(),
            runtime_status: self.status,
            input: self.input.target.clone(),
            output: self.output.clone(),
            error: self.error.clone(),
            created_time: self.created_at,
            last_updated_time: self.updated_at,
        }
    }
}

/// Status document returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceStatusView {
    pub instance_id: String,
    pub runtime_status: InstanceStatus,
    pub input: InspectionTarget,
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_time: DateTime<Utc>,
    pub last_updated_time: DateTime<Utc>,
}

//! Workflow runs and actions as returned by the resource-management API.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ─────────────────────────────────────────────────────────────────────────────
// Status
// ─────────────────────────────────────────────────────────────────────────────

/// Status of a workflow run or action.
///
/// The wire form is the bare status string. Values this crate does not know
/// about are preserved in [`RunStatus::Other`] rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    NotSpecified,
    Paused,
    Running,
    Waiting,
    Succeeded,
    Skipped,
    Suspended,
    Cancelled,
    Failed,
    Faulted,
    TimedOut,
    Aborted,
    Ignored,
    Other(String),
}

impl RunStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::NotSpecified => "NotSpecified",
            RunStatus::Paused => "Paused",
            RunStatus::Running => "Running",
            RunStatus::Waiting => "Waiting",
            RunStatus::Succeeded => "Succeeded",
            RunStatus::Skipped => "Skipped",
            RunStatus::Suspended => "Suspended",
            RunStatus::Cancelled => "Cancelled",
            RunStatus::Failed => "Failed",
            RunStatus::Faulted => "Faulted",
            RunStatus::TimedOut => "TimedOut",
            RunStatus::Aborted => "Aborted",
            RunStatus::Ignored => "Ignored",
            RunStatus::Other(s) => s,
        }
    }

    /// True only for the exact status string `Failed`.
    pub fn is_failed(&self) -> bool {
        matches!(self, RunStatus::Failed)
    }
}

impl From<String> for RunStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "NotSpecified" => RunStatus::NotSpecified,
            "Paused" => RunStatus::Paused,
            "Running" => RunStatus::Running,
            "Waiting" => RunStatus::Waiting,
            "Succeeded" => RunStatus::Succeeded,
            "Skipped" => RunStatus::Skipped,
            "Suspended" => RunStatus::Suspended,
            "Cancelled" => RunStatus::Cancelled,
            "Failed" => RunStatus::Failed,
            "Faulted" => RunStatus::Faulted,
            "TimedOut" => RunStatus::TimedOut,
            "Aborted" => RunStatus::Aborted,
            "Ignored" => RunStatus::Ignored,
            _ => RunStatus::Other(value),
        }
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// List envelope
// ─────────────────────────────────────────────────────────────────────────────

/// The `{ "value": [...], "nextLink": ... }` envelope used by list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ResourceList<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub value: Vec<T>,
    #[serde(
        rename = "nextLink",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub next_link: Option<String>,
}

impl<T> Default for ResourceList<T> {
    fn default() -> Self {
        Self {
            value: Vec::new(),
            next_link: None,
        }
    }
}

impl<T> ResourceList<T> {
    pub fn new(value: Vec<T>) -> Self {
        Self {
            value,
            next_link: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Runs
// ─────────────────────────────────────────────────────────────────────────────

/// One execution instance of a workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowRun {
    /// Run identifier.
    pub name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub properties: RunProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunProperties {
    pub status: Option<RunStatus>,
    /// Everything else the API reports about the run (timestamps, trigger, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkflowRun {
    pub fn new(name: impl Into<String>, status: RunStatus) -> Self {
        Self {
            name: Some(name.into()),
            properties: RunProperties {
                status: Some(status),
                extra: Map::new(),
            },
        }
    }

    pub fn status(&self) -> Option<&RunStatus> {
        self.properties.status.as_ref()
    }

    pub fn is_failed(&self) -> bool {
        self.status().is_some_and(RunStatus::is_failed)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Actions
// ─────────────────────────────────────────────────────────────────────────────

/// A single step within a workflow run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowAction {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub properties: ActionProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionProperties {
    pub status: Option<RunStatus>,
    /// Usually a string, kept as whatever the API sent.
    pub code: Option<Value>,
    /// The error object verbatim. Only `message` is ever read from it.
    pub error: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkflowAction {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, status: RunStatus) -> Self {
        Self {
            name: Some(name.into()),
            kind: Some(kind.into()),
            properties: ActionProperties {
                status: Some(status),
                ..Default::default()
            },
        }
    }

    /// Attach an error object (builder style).
    pub fn with_error(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = Value::String(code.into());
        let mut error = Map::new();
        error.insert("code".to_string(), code.clone());
        error.insert("message".to_string(), Value::String(message.into()));
        self.properties.code = Some(code);
        self.properties.error = Some(Value::Object(error));
        self
    }

    pub fn is_failed(&self) -> bool {
        self.properties
            .status
            .as_ref()
            .is_some_and(RunStatus::is_failed)
    }

    /// Error message used as the deduplication key. Absent or non-string
    /// reads as `""`.
    pub fn error_message(&self) -> &str {
        self.properties
            .error
            .as_ref()
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("")
    }
}

/// Treat an explicit JSON `null` the same as an absent field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

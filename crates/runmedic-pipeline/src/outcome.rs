//! Inspection outcomes and their JSON renderings.

use runmedic_types::FailureRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::remediation::Remediation;

/// Reported when no failed run produced a retained action.
pub const NO_FAILURES_MESSAGE: &str = "No failed run actions found.";

/// Reported when the generative backend gave no usable answer.
pub const REMEDIATION_FAILED_MESSAGE: &str = "Failed to get updated code from Google API.";

/// `{"updatedcode": {"text": ...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleResponse {
    #[serde(rename = "updatedcode")]
    pub updated_code: UpdatedCode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatedCode {
    pub text: String,
}

/// Successful result body: the failures and the suggested fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationReport {
    pub failed_run_actions: Vec<FailureRecord>,
    pub google_response: GoogleResponse,
}

impl RemediationReport {
    pub fn new(failed_run_actions: Vec<FailureRecord>, text: impl Into<String>) -> Self {
        Self {
            failed_run_actions,
            google_response: GoogleResponse {
                updated_code: UpdatedCode { text: text.into() },
            },
        }
    }
}

/// Result of one inspection, shared by both drivers.
#[derive(Debug, Clone, PartialEq)]
pub enum InspectionOutcome {
    /// No failed run produced a retained action. The backend was not called.
    NoFailures,
    /// Failures were found and the backend proposed a fix.
    Remediated(RemediationReport),
    /// Failures were found but the backend gave no usable answer.
    RemediationUnavailable {
        failed_run_actions: Vec<FailureRecord>,
        reason: String,
    },
}

impl InspectionOutcome {
    /// Combine collected failures with a remediation result.
    pub fn from_remediation(records: Vec<FailureRecord>, remediation: Remediation) -> Self {
        match remediation {
            Remediation::Updated { text } => {
                InspectionOutcome::Remediated(RemediationReport::new(records, text))
            }
            Remediation::Unavailable { reason } => InspectionOutcome::RemediationUnavailable {
                failed_run_actions: records,
                reason,
            },
        }
    }

    /// The orchestration output document.
    pub fn to_output(&self) -> Value {
        match self {
            InspectionOutcome::NoFailures => json!({ "message": NO_FAILURES_MESSAGE }),
            InspectionOutcome::Remediated(report) => {
                serde_json::to_value(report).unwrap_or_else(|e| json!({ "error": e.to_string() }))
            }
            InspectionOutcome::RemediationUnavailable { .. } => {
                json!({ "error": REMEDIATION_FAILED_MESSAGE })
            }
        }
    }
}

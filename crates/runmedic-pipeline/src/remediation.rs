//! Remediation requests to the generative-language backend.

use runmedic_llm::{GenerateRequest, LlmError, SharedBackend};
use runmedic_types::{FailureRecord, WorkflowCode};
use serde::{Deserialize, Serialize};

/// Suffix appended to the prompt when only raw code is wanted.
const RAW_CODE_SUFFIX: &str = " without code explanation, just raw updated code";

/// Build the remediation prompt.
pub fn build_prompt(
    code: &WorkflowCode,
    records: &[FailureRecord],
    raw_code_only: bool,
) -> serde_json::Result<String> {
    let mut prompt = format!(
        "Based on the following workflow code and errors, provide updated code:\n\n\
         Workflow Code: {}\nErrors: {}",
        serde_json::to_string(code)?,
        serde_json::to_string(records)?,
    );
    if raw_code_only {
        prompt.push_str(RAW_CODE_SUFFIX);
    }
    Ok(prompt)
}

/// Outcome of a remediation request.
///
/// A failed request is a value, not an error: callers report it as a
/// distinct outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Remediation {
    /// The model answered; `text` is the first candidate's first part.
    Updated { text: String },
    /// No usable answer.
    Unavailable { reason: String },
}

impl Remediation {
    pub fn is_available(&self) -> bool {
        matches!(self, Remediation::Updated { .. })
    }
}

/// Sends failure context to the generative backend.
pub struct RemediationRequester {
    backend: SharedBackend,
    raw_code_only: bool,
}

impl RemediationRequester {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            raw_code_only: false,
        }
    }

    /// Ask for raw code only.
    pub fn with_raw_code_only(mut self, raw_code_only: bool) -> Self {
        self.raw_code_only = raw_code_only;
        self
    }

    /// Request updated code. Never fails; see [`Remediation`].
    pub async fn request(&self, code: &WorkflowCode, records: &[FailureRecord]) -> Remediation {
        let prompt = match build_prompt(code, records, self.raw_code_only) {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize remediation prompt");
                return Remediation::Unavailable {
                    reason: format!("prompt serialization failed: {}", e),
                };
            }
        };

        tracing::info!(
            backend = self.backend.name(),
            runs = records.len(),
            "Requesting remediation"
        );

        match self.backend.generate(GenerateRequest::from_text(prompt)).await {
            Ok(response) => match response.first_text() {
                Some(text) => Remediation::Updated { text },
                None => {
                    tracing::error!(
                        backend = self.backend.name(),
                        "Generative API returned no candidates"
                    );
                    Remediation::Unavailable {
                        reason: "response contained no candidates".to_string(),
                    }
                }
            },
            Err(e) => {
                let reason = match &e {
                    LlmError::Status { status, .. } => format!("status {}", status),
                    other => other.to_string(),
                };
                tracing::error!(
                    backend = self.backend.name(),
                    error = %e,
                    "Generative API request failed"
                );
                Remediation::Unavailable { reason }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use runmedic_llm::{MockBackend, MockResponse};
    use runmedic_types::{FailureDetail, RunStatus, WorkflowAction};
    use serde_json::json;

    fn code() -> WorkflowCode {
        WorkflowCode {
            definition: json!({"actions": {}}),
            parameters: json!({}),
        }
    }

    fn records() -> Vec<FailureRecord> {
        let action =
            WorkflowAction::new("a", "Http", RunStatus::Failed).with_error("E", "boom");
        vec![FailureRecord::new("r1", vec![FailureDetail::from_action(&action)])]
    }

    #[test]
    fn test_prompt_text() {
        let prompt = build_prompt(&code(), &[], false).unwrap();
        assert_eq!(
            prompt,
            "Based on the following workflow code and errors, provide updated code:\n\n\
             Workflow Code: {\"definition\":{\"actions\":{}},\"parameters\":{}}\nErrors: []"
        );
    }

    #[test]
    fn test_prompt_raw_code_suffix() {
        let prompt = build_prompt(&code(), &records(), true).unwrap();
        assert!(prompt.contains("\"workflow-error\""));
        assert!(prompt.ends_with(" without code explanation, just raw updated code"));
    }

    #[tokio::test]
    async fn test_updated_text() {
        let backend = Arc::new(MockBackend::with_text("new code"));
        let requester = RemediationRequester::new(backend.clone());
        let result = requester.request(&code(), &records()).await;
        assert_eq!(
            result,
            Remediation::Updated {
                text: "new code".into()
            }
        );
        assert_eq!(backend.request_count(), 1);
        assert!(backend.requests()[0].text().starts_with("Based on"));
    }

    #[tokio::test]
    async fn test_non_200_is_unavailable() {
        let backend = Arc::new(MockBackend::new(vec![MockResponse::Status(
            500,
            "internal".into(),
        )]));
        let result = RemediationRequester::new(backend)
            .request(&code(), &records())
            .await;
        assert_eq!(
            result,
            Remediation::Unavailable {
                reason: "status 500".into()
            }
        );
    }

    #[tokio::test]
    async fn test_empty_candidates_is_unavailable() {
        let backend = Arc::new(MockBackend::new(vec![MockResponse::NoCandidates]));
        let result = RemediationRequester::new(backend)
            .request(&code(), &records())
            .await;
        assert!(!result.is_available());
    }

    #[test]
    fn test_remediation_wire_shape() {
        let value = serde_json::to_value(Remediation::Updated { text: "x".into() }).unwrap();
        assert_eq!(value, json!({"kind": "updated", "text": "x"}));
    }
}

//! Direct request/response driver.
//!
//! The workflow-details fetch runs alongside the runs fetch and the per-run
//! action lookups. Lookups are bounded by `max_concurrent_lookups` and their
//! results come back in input order, so records follow the runs list.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use runmedic_resource::SharedResourceApi;
use runmedic_types::{BearerCredential, InspectionTarget, WorkflowCode, config_defaults};

use crate::error::{PipelineError, Result};
use crate::extract::{extract_failures, failed_runs};
use crate::outcome::InspectionOutcome;
use crate::remediation::RemediationRequester;

/// Concurrent inspection driver.
#[derive(Clone)]
pub struct ConcurrentDriver {
    resources: SharedResourceApi,
    remediation: Arc<RemediationRequester>,
    max_concurrent_lookups: usize,
}

impl ConcurrentDriver {
    pub fn new(resources: SharedResourceApi, remediation: Arc<RemediationRequester>) -> Self {
        Self {
            resources,
            remediation,
            max_concurrent_lookups: config_defaults::MAX_CONCURRENT_LOOKUPS,
        }
    }

    /// Bound the number of in-flight action lookups. Zero is treated as one.
    pub fn with_max_concurrent_lookups(mut self, limit: usize) -> Self {
        self.max_concurrent_lookups = limit.max(1);
        self
    }

    /// Inspect one workflow.
    ///
    /// A runs-list failure is reported ahead of a workflow-details failure.
    /// The remediation backend is only called when failures were found.
    pub async fn inspect(
        &self,
        target: &InspectionTarget,
        credential: &BearerCredential,
    ) -> Result<InspectionOutcome> {
        tracing::info!(workflow = %target, "Inspecting workflow");

        let workflow = self.resources.get_workflow(target, credential);
        let failures = async {
            let runs = self
                .resources
                .list_runs(target, credential)
                .await
                .map_err(PipelineError::Runs)?;

            let run_ids: Vec<String> = failed_runs(&runs.value).map(str::to_string).collect();
            let lookups: Vec<_> = stream::iter(run_ids)
                .map(|run_id| async move {
                    let result = self
                        .resources
                        .list_run_actions(target, &run_id, credential)
                        .await
                        .map(|list| list.value);
                    (run_id, result)
                })
                .buffered(self.max_concurrent_lookups)
                .collect()
                .await;

            tracing::debug!(
                runs = runs.value.len(),
                lookups = lookups.len(),
                "Action lookups complete"
            );
            Ok::<_, PipelineError>(extract_failures(&runs.value, lookups))
        };

        let (workflow, failures) = tokio::join!(workflow, failures);
        let records = failures?;
        let workflow = workflow.map_err(PipelineError::Workflow)?;

        if records.is_empty() {
            tracing::info!(workflow = %target, "No failed run actions found");
            return Ok(InspectionOutcome::NoFailures);
        }

        let code = WorkflowCode::from(workflow);
        let remediation = self.remediation.request(&code, &records).await;
        Ok(InspectionOutcome::from_remediation(records, remediation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use runmedic_llm::{MockBackend, MockResponse};
    use runmedic_resource::{MockCall, MockResourceApi, ResourceError};
    use runmedic_types::{RunStatus, WorkflowAction, WorkflowRun};

    fn target() -> InspectionTarget {
        InspectionTarget::new("sub", "rg", "wf")
    }

    fn credential() -> BearerCredential {
        BearerCredential::from_token("tok")
    }

    fn failed(name: &str, message: &str) -> WorkflowAction {
        WorkflowAction::new(name, "Http", RunStatus::Failed).with_error("E", message)
    }

    fn driver(api: MockResourceApi, backend: MockBackend) -> (ConcurrentDriver, Arc<MockResourceApi>, Arc<MockBackend>) {
        let api = Arc::new(api);
        let backend = Arc::new(backend);
        let remediation = Arc::new(RemediationRequester::new(backend.clone()));
        (ConcurrentDriver::new(api.clone(), remediation), api, backend)
    }

    fn upstream(status: u16) -> ResourceError {
        ResourceError::Upstream {
            status,
            body: "error body".into(),
        }
    }

    #[tokio::test]
    async fn test_inspect_runs_on_spawned_task() {
        let api = MockResourceApi::new()
            .with_runs(vec![WorkflowRun::new("r1", RunStatus::Failed)])
            .with_actions("r1", vec![failed("A", "boom")]);
        let (driver, _api, _backend) = driver(api, MockBackend::with_text("fixed"));

        let handle = tokio::spawn(async move { driver.inspect(&target(), &credential()).await });
        let outcome = handle.await.unwrap().unwrap();
        assert!(matches!(outcome, InspectionOutcome::Remediated(_)));
    }

    #[tokio::test]
    async fn test_no_failed_runs_means_no_lookups() {
        let api = MockResourceApi::new().with_runs(vec![
            WorkflowRun::new("r1", RunStatus::Succeeded),
            WorkflowRun::new("r2", RunStatus::Running),
        ]);
        let (driver, api, backend) = driver(api, MockBackend::with_text("unused"));

        let outcome = driver.inspect(&target(), &credential()).await.unwrap();
        assert_eq!(outcome, InspectionOutcome::NoFailures);
        assert_eq!(api.action_lookup_count(), 0);
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_remediated_outcome() {
        let api = MockResourceApi::new()
            .with_runs(vec![WorkflowRun::new("r1", RunStatus::Failed)])
            .with_actions("r1", vec![failed("a", "boom")]);
        let (driver, api, backend) = driver(api, MockBackend::with_text("fixed code"));

        let outcome = driver.inspect(&target(), &credential()).await.unwrap();
        match outcome {
            InspectionOutcome::Remediated(report) => {
                assert_eq!(report.google_response.updated_code.text, "fixed code");
                assert_eq!(report.failed_run_actions.len(), 1);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(backend.request_count(), 1);
        assert!(api.credentials_seen().iter().all(|c| c == "Bearer tok"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_preserved_under_uneven_latency() {
        let api = MockResourceApi::new()
            .with_runs(vec![
                WorkflowRun::new("slow", RunStatus::Failed),
                WorkflowRun::new("ok", RunStatus::Succeeded),
                WorkflowRun::new("fast", RunStatus::Failed),
            ])
            .with_actions("slow", vec![failed("a", "one")])
            .with_actions("fast", vec![failed("b", "two")])
            .with_latency("slow", Duration::from_millis(500));
        let (driver, _api, _backend) = driver(api, MockBackend::with_text("fix"));

        let outcome = driver.inspect(&target(), &credential()).await.unwrap();
        let InspectionOutcome::Remediated(report) = outcome else {
            panic!("expected remediation");
        };
        let ids: Vec<_> = report
            .failed_run_actions
            .iter()
            .map(|r| r.run_id.as_str())
            .collect();
        assert_eq!(ids, vec!["slow", "fast"]);
    }

    #[tokio::test]
    async fn test_dedup_spans_runs() {
        let api = MockResourceApi::new()
            .with_runs(vec![
                WorkflowRun::new("r1", RunStatus::Failed),
                WorkflowRun::new("r2", RunStatus::Failed),
            ])
            .with_actions("r1", vec![failed("a", "same"), failed("b", "same")])
            .with_actions("r2", vec![failed("c", "same")]);
        let (driver, _api, _backend) = driver(api, MockBackend::with_text("fix"));

        let InspectionOutcome::Remediated(report) =
            driver.inspect(&target(), &credential()).await.unwrap()
        else {
            panic!("expected remediation");
        };
        assert_eq!(report.failed_run_actions.len(), 1);
        assert_eq!(report.failed_run_actions[0].details.len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_run_id_looked_up_once() {
        let api = MockResourceApi::new()
            .with_runs(vec![
                WorkflowRun::new("r1", RunStatus::Failed),
                WorkflowRun::new("r1", RunStatus::Failed),
            ])
            .with_actions("r1", vec![failed("a", "boom")]);
        let (driver, api, _backend) = driver(api, MockBackend::with_text("fix"));

        let InspectionOutcome::Remediated(report) =
            driver.inspect(&target(), &credential()).await.unwrap()
        else {
            panic!("expected remediation");
        };
        assert_eq!(report.failed_run_actions.len(), 1);
        assert_eq!(api.action_lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_lookup_skips_run() {
        let api = MockResourceApi::new()
            .with_runs(vec![
                WorkflowRun::new("r1", RunStatus::Failed),
                WorkflowRun::new("r2", RunStatus::Failed),
            ])
            .with_actions_error("r1", upstream(404))
            .with_actions("r2", vec![failed("b", "two")]);
        let (driver, api, _backend) = driver(api, MockBackend::with_text("fix"));

        let InspectionOutcome::Remediated(report) =
            driver.inspect(&target(), &credential()).await.unwrap()
        else {
            panic!("expected remediation");
        };
        assert_eq!(report.failed_run_actions[0].run_id, "r2");
        assert_eq!(api.action_lookup_count(), 2);
    }

    #[tokio::test]
    async fn test_runs_error_aborts() {
        let api = MockResourceApi::new()
            .with_runs_error(upstream(403))
            .with_workflow_error(upstream(500));
        let (driver, api, _backend) = driver(api, MockBackend::with_text("fix"));

        let err = driver.inspect(&target(), &credential()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Runs(_)));
        assert!(err.to_string().starts_with("API call to get runs failed: 403"));
        assert!(!api.calls().iter().any(|c| matches!(c, MockCall::ListRunActions(_))));
    }

    #[tokio::test]
    async fn test_workflow_error_aborts_even_without_failures() {
        let api = MockResourceApi::new().with_workflow_error(upstream(404));
        let (driver, _api, _backend) = driver(api, MockBackend::with_text("fix"));

        let err = driver.inspect(&target(), &credential()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Workflow(_)));
        assert!(err.to_string().starts_with("Failed to get workflow details:"));
    }

    #[tokio::test]
    async fn test_remediation_unavailable() {
        let api = MockResourceApi::new()
            .with_runs(vec![WorkflowRun::new("r1", RunStatus::Failed)])
            .with_actions("r1", vec![failed("a", "boom")]);
        let (driver, _api, _backend) = driver(
            api,
            MockBackend::new(vec![MockResponse::Status(429, "quota".into())]),
        );

        let outcome = driver.inspect(&target(), &credential()).await.unwrap();
        assert!(matches!(
            outcome,
            InspectionOutcome::RemediationUnavailable { .. }
        ));
    }

    #[tokio::test]
    async fn test_concurrency_limit_of_one_still_completes() {
        let runs: Vec<_> = (0..5)
            .map(|i| WorkflowRun::new(format!("r{i}"), RunStatus::Failed))
            .collect();
        let mut api = MockResourceApi::new().with_runs(runs);
        for i in 0..5 {
            api = api.with_actions(format!("r{i}"), vec![failed("a", &format!("m{i}"))]);
        }
        let (driver, api, _backend) = driver(api, MockBackend::with_text("fix"));
        let driver = driver.with_max_concurrent_lookups(1);

        let InspectionOutcome::Remediated(report) =
            driver.inspect(&target(), &credential()).await.unwrap()
        else {
            panic!("expected remediation");
        };
        assert_eq!(report.failed_run_actions.len(), 5);
        assert_eq!(api.action_lookup_count(), 5);
    }
}

//! The inspection orchestration routine and its activities.
//!
//! The routine reads no clock and no randomness. Every external call goes
//! through [`OrchestrationContext::call_activity`], so a replay against the
//! same journal takes the same path and produces the same output.

use std::sync::Arc;

use runmedic_resource::SharedResourceApi;
use runmedic_types::{ResourceList, WorkflowAction, WorkflowCode, WorkflowDetails, WorkflowRun};

use super::checkpoint::{ActivityFailure, OrchestrationInput};
use super::context::OrchestrationContext;
use crate::error::OrchestrationError;
use crate::extract::{FailureCollector, failed_runs};
use crate::outcome::InspectionOutcome;
use crate::remediation::{Remediation, RemediationRequester};

pub const GET_WORKFLOW_DETAILS: &str = "get_workflow_details";
pub const GET_WORKFLOW_RUNS: &str = "get_workflow_runs";
pub const GET_ACTIONS_FOR_RUN: &str = "get_actions_for_run";
pub const REQUEST_REMEDIATION: &str = "request_remediation";

/// Services the activities call into.
#[derive(Clone)]
pub struct Activities {
    pub resources: SharedResourceApi,
    pub remediation: Arc<RemediationRequester>,
}

/// Drive one inspection through `ctx`.
///
/// A failure of the workflow-details or runs activity fails the
/// orchestration. A failed action lookup only skips that run.
pub async fn inspect_orchestration(
    ctx: &mut OrchestrationContext,
    input: &OrchestrationInput,
    activities: &Activities,
) -> Result<InspectionOutcome, OrchestrationError> {
    let target = &input.target;
    let credential = &input.bearer_token;
    let resources = &activities.resources;

    let workflow: WorkflowDetails = ctx
        .call_activity(GET_WORKFLOW_DETAILS, move || async move {
            resources
                .get_workflow(target, credential)
                .await
                .map_err(ActivityFailure::from)
        })
        .await?
        .map_err(|e| {
            OrchestrationError::ActivityFailed(format!("Failed to get workflow details: {}", e))
        })?;

    let runs: ResourceList<WorkflowRun> = ctx
        .call_activity(GET_WORKFLOW_RUNS, move || async move {
            resources
                .list_runs(target, credential)
                .await
                .map_err(ActivityFailure::from)
        })
        .await?
        .map_err(|e| {
            OrchestrationError::ActivityFailed(format!("API call to get runs failed: {}", e))
        })?;

    let mut collector = FailureCollector::new();
    for run_id in failed_runs(&runs.value) {
        let actions: Result<ResourceList<WorkflowAction>, ActivityFailure> = ctx
            .call_activity(GET_ACTIONS_FOR_RUN, move || async move {
                resources
                    .list_run_actions(target, run_id, credential)
                    .await
                    .map_err(ActivityFailure::from)
            })
            .await?;

        match actions {
            Ok(list) => {
                collector.record_run(run_id, &list.value);
            }
            Err(e) => collector.skip_run(run_id, &e),
        }
    }

    let records = collector.finish();
    if records.is_empty() {
        return Ok(InspectionOutcome::NoFailures);
    }

    let code = WorkflowCode::from(workflow);
    let remediation_requester = &activities.remediation;
    let code_ref = &code;
    let records_ref = &records;
    let remediation = ctx
        .call_activity(REQUEST_REMEDIATION, move || async move {
            Ok(remediation_requester.request(code_ref, records_ref).await)
        })
        .await?
        .unwrap_or_else(|e| Remediation::Unavailable { reason: e.message });

    Ok(InspectionOutcome::from_remediation(records, remediation))
}

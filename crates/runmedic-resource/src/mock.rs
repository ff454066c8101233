//! In-memory [`ResourceApi`] for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use runmedic_types::{
    BearerCredential, InspectionTarget, ResourceList, WorkflowAction, WorkflowDetails, WorkflowRun,
};

use crate::api::ResourceApi;
use crate::error::{ResourceError, Result};

/// One recorded call against [`MockResourceApi`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MockCall {
    GetWorkflow,
    ListRuns,
    ListRunActions(String),
}

/// Mock resource API for testing.
///
/// Serves canned responses, records every call with the credential it
/// carried, and can inject errors and per-run latency. Unknown runs answer
/// with an empty action list.
pub struct MockResourceApi {
    workflow: Result<WorkflowDetails>,
    runs: Result<ResourceList<WorkflowRun>>,
    actions: HashMap<String, Result<ResourceList<WorkflowAction>>>,
    latency: HashMap<String, Duration>,
    queued_errors: Mutex<HashMap<MockCall, VecDeque<ResourceError>>>,
    call_log: Mutex<Vec<(MockCall, String)>>,
}

impl Default for MockResourceApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResourceApi {
    /// An API with an empty workflow and no runs.
    pub fn new() -> Self {
        Self {
            workflow: Ok(WorkflowDetails::default()),
            runs: Ok(ResourceList::default()),
            actions: HashMap::new(),
            latency: HashMap::new(),
            queued_errors: Mutex::new(HashMap::new()),
            call_log: Mutex::new(Vec::new()),
        }
    }

    pub fn with_workflow(mut self, workflow: WorkflowDetails) -> Self {
        self.workflow = Ok(workflow);
        self
    }

    pub fn with_workflow_error(mut self, error: ResourceError) -> Self {
        self.workflow = Err(error);
        self
    }

    pub fn with_runs(mut self, runs: Vec<WorkflowRun>) -> Self {
        self.runs = Ok(ResourceList::new(runs));
        self
    }

    pub fn with_runs_error(mut self, error: ResourceError) -> Self {
        self.runs = Err(error);
        self
    }

    pub fn with_actions(mut self, run_id: impl Into<String>, actions: Vec<WorkflowAction>) -> Self {
        self.actions
            .insert(run_id.into(), Ok(ResourceList::new(actions)));
        self
    }

    pub fn with_actions_error(mut self, run_id: impl Into<String>, error: ResourceError) -> Self {
        self.actions.insert(run_id.into(), Err(error));
        self
    }

    /// Delay the action lookup of one run.
    pub fn with_latency(mut self, run_id: impl Into<String>, delay: Duration) -> Self {
        self.latency.insert(run_id.into(), delay);
        self
    }

    /// Fail the next `times` invocations of `call` with `error`, then serve
    /// the configured response.
    pub fn fail_times(self, call: MockCall, times: usize, error: ResourceError) -> Self {
        self.queued_errors
            .lock()
            .unwrap()
            .entry(call)
            .or_default()
            .extend(std::iter::repeat_n(error, times));
        self
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .map(|(call, _)| call.clone())
            .collect()
    }

    /// The `Authorization` header value sent with each call.
    pub fn credentials_seen(&self) -> Vec<String> {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .map(|(_, credential)| credential.clone())
            .collect()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }

    /// Number of action lookups made so far.
    pub fn action_lookup_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MockCall::ListRunActions(_)))
            .count()
    }

    fn record(&self, call: MockCall, credential: &BearerCredential) -> Option<ResourceError> {
        self.call_log
            .lock()
            .unwrap()
            .push((call.clone(), credential.header_value().to_string()));
        self.queued_errors
            .lock()
            .unwrap()
            .get_mut(&call)
            .and_then(VecDeque::pop_front)
    }
}

#[async_trait]
impl ResourceApi for MockResourceApi {
    async fn get_workflow(
        &self,
        _target: &InspectionTarget,
        credential: &BearerCredential,
    ) -> Result<WorkflowDetails> {
        if let Some(error) = self.record(MockCall::GetWorkflow, credential) {
            return Err(error);
        }
        self.workflow.clone()
    }

    async fn list_runs(
        &self,
        _target: &InspectionTarget,
        credential: &BearerCredential,
    ) -> Result<ResourceList<WorkflowRun>> {
        if let Some(error) = self.record(MockCall::ListRuns, credential) {
            return Err(error);
        }
        self.runs.clone()
    }

    async fn list_run_actions(
        &self,
        _target: &InspectionTarget,
        run_id: &str,
        credential: &BearerCredential,
    ) -> Result<ResourceList<WorkflowAction>> {
        let queued = self.record(MockCall::ListRunActions(run_id.to_string()), credential);

        if let Some(delay) = self.latency.get(run_id) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(error) = queued {
            return Err(error);
        }

        self.actions
            .get(run_id)
            .cloned()
            .unwrap_or_else(|| Ok(ResourceList::default()))
    }
}

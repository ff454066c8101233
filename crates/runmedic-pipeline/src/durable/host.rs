//! Hosts orchestration instances: start, run, query and resume.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use runmedic_resource::SharedResourceApi;
use uuid::Uuid;

use super::checkpoint::{
    InstanceStatus, InstanceStatusView, OrchestrationInput, OrchestrationInstance,
};
use super::context::OrchestrationContext;
use super::orchestration::{Activities, inspect_orchestration};
use super::retry::RetryPolicy;
use super::store::SharedCheckpointStore;
use crate::error::OrchestrationError;
use crate::remediation::RemediationRequester;

/// Result type for host operations.
pub type Result<T> = std::result::Result<T, OrchestrationError>;

/// Runs durable inspections on the tokio runtime.
///
/// Cheap to clone; clones share the store and the set of in-flight instances.
#[derive(Clone)]
pub struct OrchestrationHost {
    store: SharedCheckpointStore,
    activities: Activities,
    retry: RetryPolicy,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl OrchestrationHost {
    pub fn new(
        store: SharedCheckpointStore,
        resources: SharedResourceApi,
        remediation: Arc<RemediationRequester>,
    ) -> Self {
        Self {
            store,
            activities: Activities {
                resources,
                remediation,
            },
            retry: RetryPolicy::default(),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Set the activity retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn store(&self) -> &SharedCheckpointStore {
        &self.store
    }

    /// Persist a new `Pending` instance and spawn it. Returns the instance id.
    pub fn start(&self, input: OrchestrationInput) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.store
            .create_instance(&OrchestrationInstance::pending(&id, input))?;
        tracing::info!(instance_id = %id, "Orchestration scheduled");

        self.spawn(id.clone());
        Ok(id)
    }

    fn spawn(&self, id: String) {
        let host = self.clone();
        tokio::spawn(async move {
            if let Err(e) = host.run_instance(&id).await {
                tracing::error!(instance_id = %id, error = %e, "Orchestration host error");
            }
        });
    }

    /// Drive an instance to completion, replaying any journaled activities.
    ///
    /// Completed and failed instances are returned unchanged. An instance
    /// already being driven in this process is left alone.
    pub async fn run_instance(&self, id: &str) -> Result<OrchestrationInstance> {
        let instance = self
            .store
            .get_instance(id)?
            .ok_or_else(|| OrchestrationError::NotFound(id.to_string()))?;
        if !instance.status.is_incomplete() {
            return Ok(instance);
        }

        if !self.in_flight.lock().insert(id.to_string()) {
            tracing::debug!(instance_id = %id, "Orchestration already running");
            return Ok(instance);
        }
        let result = self.drive(instance).await;
        self.in_flight.lock().remove(id);
        result
    }

    async fn drive(&self, instance: OrchestrationInstance) -> Result<OrchestrationInstance> {
        let id = instance.id.as_str();
        self.store
            .update_status(id, InstanceStatus::Running, None, None)?;

        let history = self.store.load_checkpoints(id)?;
        tracing::info!(
            instance_id = %id,
            workflow = %instance.input.target,
            journaled = history.len(),
            "Running orchestration"
        );

        let mut ctx =
            OrchestrationContext::new(id, self.store.clone(), history, self.retry.clone());

        match inspect_orchestration(&mut ctx, &instance.input, &self.activities).await {
            Ok(outcome) => {
                let output = outcome.to_output();
                self.store
                    .update_status(id, InstanceStatus::Completed, Some(&output), None)?;
                tracing::info!(instance_id = %id, activities = ctx.calls_made(), "Orchestration completed");
            }
            Err(e) => {
                tracing::error!(instance_id = %id, error = %e, "Orchestration failed");
                self.store
                    .update_status(id, InstanceStatus::Failed, None, Some(&e.to_string()))?;
            }
        }

        self.store
            .get_instance(id)?
            .ok_or_else(|| OrchestrationError::NotFound(id.to_string()))
    }

    /// Public status of an instance, `None` if unknown.
    pub fn status(&self, id: &str) -> Result<Option<InstanceStatusView>> {
        Ok(self
            .store
            .get_instance(id)?
            .map(|instance| instance.status_view()))
    }

    /// Spawn every `Pending` or `Running` instance. Returns how many.
    pub fn resume_incomplete(&self) -> Result<usize> {
        let instances = self.store.list_incomplete()?;
        for instance in &instances {
            tracing::info!(instance_id = %instance.id, status = %instance.status, "Resuming orchestration");
            self.spawn(instance.id.clone());
        }
        Ok(instances.len())
    }

    /// Poll until the instance leaves `Pending`/`Running`.
    pub async fn wait_for_completion(
        &self,
        id: &str,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<OrchestrationInstance> {
        let poll = async {
            loop {
                let instance = self
                    .store
                    .get_instance(id)?
                    .ok_or_else(|| OrchestrationError::NotFound(id.to_string()))?;
                if !instance.status.is_incomplete() {
                    return Ok(instance);
                }
                tokio::time::sleep(poll_interval).await;
            }
        };

        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| OrchestrationError::Timeout(id.to_string()))?
    }
}

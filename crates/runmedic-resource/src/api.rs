//! The resource-management operations the inspection pipeline depends on.

use std::sync::Arc;

use async_trait::async_trait;
use runmedic_types::{
    BearerCredential, InspectionTarget, ResourceList, WorkflowAction, WorkflowDetails, WorkflowRun,
};

use crate::error::Result;

/// Read-only workflow queries, authorized with the caller's credential.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// Fetch the workflow definition and parameters.
    async fn get_workflow(
        &self,
        target: &InspectionTarget,
        credential: &BearerCredential,
    ) -> Result<WorkflowDetails>;

    /// List the workflow's runs.
    async fn list_runs(
        &self,
        target: &InspectionTarget,
        credential: &BearerCredential,
    ) -> Result<ResourceList<WorkflowRun>>;

    /// List the actions of one run.
    async fn list_run_actions(
        &self,
        target: &InspectionTarget,
        run_id: &str,
        credential: &BearerCredential,
    ) -> Result<ResourceList<WorkflowAction>>;
}

/// A shared, thread-safe resource client.
pub type SharedResourceApi = Arc<dyn ResourceApi>;

//! Shared wire types for the runmedic inspection service.
//!
//! These types mirror the JSON returned by the resource-management API
//! (workflow details, runs, actions) and the derived failure records that
//! are handed to the remediation model. Every field is optional on the wire
//! and falls back to a defined default, so a sparse or unexpected payload
//! never aborts an inspection.

pub mod config;
pub mod failure;
pub mod run;
pub mod target;
pub mod workflow;

pub use config::defaults as config_defaults;
pub use failure::{FailureDetail, FailureProperties, FailureRecord};
pub use run::{
    ActionProperties, ResourceList, RunProperties, RunStatus, WorkflowAction,
    WorkflowRun,
};
pub use target::{BearerCredential, InspectionTarget};
pub use workflow::{WorkflowCode, WorkflowDetails, WorkflowProperties};

//! Checkpointed orchestration driver.
//!
//! An orchestration is a deterministic routine whose external calls are
//! activities. Each activity outcome is journaled in a [`CheckpointStore`]
//! before the routine continues, so an interrupted instance can be replayed
//! from its journal without repeating completed calls.

pub mod checkpoint;
pub mod context;
pub mod host;
pub mod orchestration;
pub mod retry;
pub mod sqlite;
pub mod store;

pub use checkpoint::{
    ActivityFailure, ActivityOutcome, Checkpoint, InstanceStatus, InstanceStatusView,
    OrchestrationInput, OrchestrationInstance,
};
pub use context::OrchestrationContext;
pub use host::OrchestrationHost;
pub use orchestration::{Activities, inspect_orchestration};
pub use retry::RetryPolicy;
pub use sqlite::SqliteCheckpointStore;
pub use store::{CheckpointStore, InMemoryCheckpointStore, SharedCheckpointStore, StoreResult};

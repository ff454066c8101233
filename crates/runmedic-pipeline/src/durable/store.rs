//! Checkpoint store trait and the in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;

use super::checkpoint::{Checkpoint, InstanceStatus, OrchestrationInstance};
use crate::error::StoreError;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Durable storage for orchestration instances and their journals.
pub trait CheckpointStore: Send + Sync {
    /// Insert a new instance.
    fn create_instance(&self, instance: &OrchestrationInstance) -> StoreResult<()>;

    /// Load an instance, `None` if unknown.
    fn get_instance(&self, id: &str) -> StoreResult<Option<OrchestrationInstance>>;

    /// Set the status, and optionally the output or error, bumping `updated_at`.
    fn update_status(
        &self,
        id: &str,
        status: InstanceStatus,
        output: Option<&Value>,
        error: Option<&str>,
    ) -> StoreResult<()>;

    /// Instances that are `Pending` or `Running`, oldest first.
    fn list_incomplete(&self) -> StoreResult<Vec<OrchestrationInstance>>;

    /// Append a journal entry.
    fn append_checkpoint(&self, id: &str, checkpoint: &Checkpoint) -> StoreResult<()>;

    /// The full journal of an instance, ordered by sequence.
    fn load_checkpoints(&self, id: &str) -> StoreResult<Vec<Checkpoint>>;
}

/// A shared, thread-safe checkpoint store.
pub type SharedCheckpointStore = Arc<dyn CheckpointStore>;

// ─────────────────────────────────────────────────────────────────────────────
// In-memory store
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Entry {
    instance: OrchestrationInstance,
    checkpoints: Vec<Checkpoint>,
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryCheckpointStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckpointStore for InMemoryCheckpointStore {
    fn create_instance(&self, instance: &OrchestrationInstance) -> StoreResult<()> {
        let mut entries = self.entries.lock();
        if entries.contains_key(&instance.id) {
            return Err(StoreError::InvalidData(format!(
                "orchestration {} already exists",
                instance.id
            )));
        }
        entries.insert(
            instance.id.clone(),
            Entry {
                instance: instance.clone(),
                checkpoints: Vec::new(),
            },
        );
        Ok(())
    }

    fn get_instance(&self, id: &str) -> StoreResult<Option<OrchestrationInstance>> {
        Ok(self.entries.lock().get(id).map(|e| e.instance.clone()))
    }

    fn update_status(
        &self,
        id: &str,
        status: InstanceStatus,
        output: Option<&Value>,
        error: Option<&str>,
    ) -> StoreResult<()> {
        let mut entries = self.entries.lock();
        let entry = entries
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        entry.instance.status = status;
        if let Some(output) = output {
            entry.instance.output = Some(output.clone());
        }
        if let Some(error) = error {
            entry.instance.error = Some(error.to_string());
        }
        entry.instance.updated_at = Utc::now();
        Ok(())
    }

    fn list_incomplete(&self) -> StoreResult<Vec<OrchestrationInstance>> {
        let mut instances: Vec<_> = self
            .entries
            .lock()
            .values()
            .filter(|e| e.instance.status.is_incomplete())
            .map(|e| e.instance.clone())
            .collect();
        instances.sort_by_key(|i| i.created_at);
        Ok(instances)
    }

    fn append_checkpoint(&self, id: &str, checkpoint: &Checkpoint) -> StoreResult<()> {
        let mut entries = self.entries.lock();
        let entry = entries
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if entry.checkpoints.len() != checkpoint.sequence as usize {
            return Err(StoreError::InvalidData(format!(
                "checkpoint {} out of order for {} (journal has {})",
                checkpoint.sequence,
                id,
                entry.checkpoints.len()
            )));
        }
        entry.checkpoints.push(checkpoint.clone());
        Ok(())
    }

    fn load_checkpoints(&self, id: &str) -> StoreResult<Vec<Checkpoint>> {
        Ok(self
            .entries
            .lock()
            .get(id)
            .map(|e| e.checkpoints.clone())
            .unwrap_or_default())
    }
}

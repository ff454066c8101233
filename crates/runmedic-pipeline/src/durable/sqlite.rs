//! SQLite checkpoint store.
//!
//! Uses WAL mode and `user_version` schema versioning. Timestamps are stored
//! as RFC 3339 text, structured values as JSON text.

use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, params};
use serde_json::Value;
use tracing::{debug, info};

use super::checkpoint::{Checkpoint, InstanceStatus, OrchestrationInstance};
use super::store::{CheckpointStore, StoreResult};
use crate::error::StoreError;

/// Current schema version.
const SCHEMA_VERSION: i32 = 1;

/// Checkpoint store backed by SQLite.
pub struct SqliteCheckpointStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteCheckpointStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCheckpointStore").finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Initialization
// ─────────────────────────────────────────────────────────────────────────────

impl SqliteCheckpointStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;

        info!(path = %path.display(), "Checkpoint store opened");
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> StoreResult<()> {
        let conn = self.conn.lock();

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let current_version: i32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap_or(0);

        if current_version >= SCHEMA_VERSION {
            debug!(version = current_version, "Checkpoint schema up to date");
            return Ok(());
        }

        info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrating checkpoint schema"
        );

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS orchestrations (
                id TEXT PRIMARY KEY,
                status TEXT NOT NULL,
                input TEXT NOT NULL,
                output TEXT,
                error TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_orchestrations_status
                ON orchestrations(status);

            CREATE TABLE IF NOT EXISTS checkpoints (
                orchestration_id TEXT NOT NULL
                    REFERENCES orchestrations(id) ON DELETE CASCADE,
                sequence INTEGER NOT NULL,
                activity TEXT NOT NULL,
                outcome TEXT NOT NULL,
                recorded_at TEXT NOT NULL,
                PRIMARY KEY (orchestration_id, sequence)
            );
            "#,
        )?;

        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row mapping
// ─────────────────────────────────────────────────────────────────────────────

fn parse_time(s: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidData(format!("bad timestamp '{}': {}", s, e)))
}

/// Raw column values of one `orchestrations` row.
struct InstanceRow {
    id: String,
    status: String,
    input: String,
    output: Option<String>,
    error: Option<String>,
    created_at: String,
    updated_at: String,
}

impl InstanceRow {
    const COLUMNS: &'static str = "id, status, input, output, error, created_at, updated_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            status: row.get(1)?,
            input: row.get(2)?,
            output: row.get(3)?,
            error: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn into_instance(self) -> StoreResult<OrchestrationInstance> {
        let status = InstanceStatus::parse(&self.status)
            .ok_or_else(|| StoreError::InvalidData(format!("unknown status '{}'", self.status)))?;
        Ok(OrchestrationInstance {
            id: self.id,
            status,
            input: serde_json::from_str(&self.input)?,
            output: self.output.as_deref().map(serde_json::from_str).transpose()?,
            error: self.error,
            created_at: parse_time(&self.created_at)?,
            updated_at: parse_time(&self.updated_at)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CheckpointStore
// ─────────────────────────────────────────────────────────────────────────────

impl CheckpointStore for SqliteCheckpointStore {
    fn create_instance(&self, instance: &OrchestrationInstance) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO orchestrations (id, status, input, output, error, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                instance.id,
                instance.status.as_str(),
                serde_json::to_string(&instance.input)?,
                instance.output.as_ref().map(serde_json::to_string).transpose()?,
                instance.error,
                instance.created_at.to_rfc3339(),
                instance.updated_at.to_rfc3339(),
            ],
        )?;
        debug!(instance_id = %instance.id, "Orchestration instance created");
        Ok(())
    }

    fn get_instance(&self, id: &str) -> StoreResult<Option<OrchestrationInstance>> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM orchestrations WHERE id = ?1",
                    InstanceRow::COLUMNS
                ),
                params![id],
                InstanceRow::from_row,
            )
            .optional()?;
        row.map(InstanceRow::into_instance).transpose()
    }

    fn update_status(
        &self,
        id: &str,
        status: InstanceStatus,
        output: Option<&Value>,
        error: Option<&str>,
    ) -> StoreResult<()> {
        let conn = self.conn.lock();
        let updated = conn.execute(
            "UPDATE orchestrations
             SET status = ?2,
                 output = COALESCE(?3, output),
                 error = COALESCE(?4, error),
                 updated_at = ?5
             WHERE id = ?1",
            params![
                id,
                status.as_str(),
                output.map(serde_json::to_string).transpose()?,
                error,
                Utc::now().to_rfc3339(),
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn list_incomplete(&self) -> StoreResult<Vec<OrchestrationInstance>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM orchestrations
             WHERE status IN ('Pending', 'Running')
             ORDER BY created_at ASC",
            InstanceRow::COLUMNS
        ))?;
        let rows = stmt
            .query_map([], InstanceRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(InstanceRow::into_instance).collect()
    }

    fn append_checkpoint(&self, id: &str, checkpoint: &Checkpoint) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO checkpoints (orchestration_id, sequence, activity, outcome, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                checkpoint.sequence,
                checkpoint.activity,
                serde_json::to_string(&checkpoint.outcome)?,
                checkpoint.recorded_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn load_checkpoints(&self, id: &str) -> StoreResult<Vec<Checkpoint>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT sequence, activity, outcome, recorded_at FROM checkpoints
             WHERE orchestration_id = ?1
             ORDER BY sequence ASC",
        )?;
        let rows = stmt
            .query_map(params![id], |row| {
                Ok((
                    row.get::<_, u32>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(sequence, activity, outcome, recorded_at)| {
                Ok(Checkpoint {
                    sequence,
                    activity,
                    outcome: serde_json::from_str(&outcome)?,
                    recorded_at: parse_time(&recorded_at)?,
                })
            })
            .collect()
    }
}

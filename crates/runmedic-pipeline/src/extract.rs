//! Failure extraction shared by both drivers.
//!
//! Only runs whose status is exactly `Failed` get an action lookup. Within a
//! run, only actions whose status is exactly `Failed` are kept, and an error
//! message that was already retained earlier in the same request (in any run)
//! is dropped. Runs left with nothing are omitted.

use std::collections::{HashMap, HashSet};
use std::fmt;

use runmedic_types::{FailureDetail, FailureRecord, WorkflowAction, WorkflowRun};

/// Identifiers of the failed runs, in list order, each at most once.
///
/// A failed run without a `name` cannot be looked up. It is logged and
/// skipped. A name repeated later in the list is skipped too.
pub fn failed_runs(runs: &[WorkflowRun]) -> impl Iterator<Item = &str> {
    let mut seen = HashSet::new();
    runs.iter().filter(|run| run.is_failed()).filter_map(move |run| {
        match run.name.as_deref() {
            Some(name) if !seen.insert(name) => {
                tracing::debug!(run_id = name, "Skipping repeated failed run");
                None
            }
            Some(name) => {
                tracing::info!(run_id = name, "Found failed run");
                Some(name)
            }
            None => {
                tracing::warn!("Skipping failed run without a name");
                None
            }
        }
    })
}

/// Accumulates failure records for one request.
///
/// The dedup set spans every run recorded into the same collector, so a
/// collector must never be shared between requests.
#[derive(Debug, Default)]
pub struct FailureCollector {
    seen_messages: HashSet<String>,
    records: Vec<FailureRecord>,
}

impl FailureCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb the actions of one failed run.
    ///
    /// Returns the number of details retained for it.
    pub fn record_run(&mut self, run_id: &str, actions: &[WorkflowAction]) -> usize {
        let mut details = Vec::new();

        for action in actions.iter().filter(|a| a.is_failed()) {
            let message = action.error_message();
            if self.seen_messages.contains(message) {
                tracing::debug!(run_id, message, "Dropping duplicate error message");
                continue;
            }
            self.seen_messages.insert(message.to_string());
            details.push(FailureDetail::from_action(action));
        }

        let retained = details.len();
        if retained > 0 {
            self.records.push(FailureRecord::new(run_id, details));
        }
        retained
    }

    /// Note that a run's action lookup failed. The run contributes nothing.
    pub fn skip_run(&mut self, run_id: &str, error: &dyn fmt::Display) {
        tracing::error!(
            run_id,
            error = %error,
            "API call to get actions for run failed"
        );
    }

    /// Records collected so far.
    pub fn records(&self) -> &[FailureRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume the collector, returning records in the order they were added.
    pub fn finish(self) -> Vec<FailureRecord> {
        self.records
    }
}

/// Build failure records from a runs list and its action lookups.
///
/// `lookups` pairs a run id with the outcome of its action lookup. Records
/// follow the order of `runs`, whatever order the lookups arrive in. A failed
/// run with no lookup entry is treated like a failed lookup.
pub fn extract_failures<I, E>(runs: &[WorkflowRun], lookups: I) -> Vec<FailureRecord>
where
    I: IntoIterator<Item = (String, Result<Vec<WorkflowAction>, E>)>,
    E: fmt::Display,
{
    let mut by_run: HashMap<String, Result<Vec<WorkflowAction>, E>> =
        lookups.into_iter().collect();
    let mut collector = FailureCollector::new();

    for run_id in failed_runs(runs) {
        match by_run.remove(run_id) {
            Some(Ok(actions)) => {
                collector.record_run(run_id, &actions);
            }
            Some(Err(e)) => collector.skip_run(run_id, &e),
            None => collector.skip_run(run_id, &"no action lookup was made"),
        }
    }

    collector.finish()
}

//! Replay-aware activity execution.

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::checkpoint::{ActivityFailure, ActivityOutcome, Checkpoint};
use super::retry::RetryPolicy;
use super::store::SharedCheckpointStore;
use crate::error::OrchestrationError;

/// Execution context handed to an orchestration routine.
///
/// Each [`call_activity`](Self::call_activity) takes the next sequence
/// number. If the journal already holds an entry for it, the recorded
/// outcome is returned and the activity is not executed. Otherwise the
/// activity runs under the retry policy and its outcome is journaled.
pub struct OrchestrationContext {
    instance_id: String,
    store: SharedCheckpointStore,
    history: Vec<Checkpoint>,
    next_sequence: u32,
    retry: RetryPolicy,
}

impl OrchestrationContext {
    pub fn new(
        instance_id: impl Into<String>,
        store: SharedCheckpointStore,
        history: Vec<Checkpoint>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            store,
            history,
            next_sequence: 0,
            retry,
        }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Whether the next call will be served from the journal.
    pub fn is_replaying(&self) -> bool {
        (self.next_sequence as usize) < self.history.len()
    }

    /// Number of activity calls made so far, replayed or executed.
    pub fn calls_made(&self) -> u32 {
        self.next_sequence
    }

    /// Invoke an activity.
    ///
    /// The outer error is an infrastructure failure that stops the
    /// orchestration. The inner result is the activity's own outcome.
    pub async fn call_activity<T, F, Fut>(
        &mut self,
        name: &str,
        f: F,
    ) -> Result<Result<T, ActivityFailure>, OrchestrationError>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ActivityFailure>>,
    {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        if let Some(recorded) = self.history.get(sequence as usize) {
            if recorded.activity != name {
                return Err(OrchestrationError::NonDeterministic {
                    sequence,
                    recorded: recorded.activity.clone(),
                    called: name.to_string(),
                });
            }
            tracing::debug!(
                instance_id = %self.instance_id,
                activity = name,
                sequence,
                "Replaying activity from journal"
            );
            return match &recorded.outcome {
                ActivityOutcome::Succeeded { output } => {
                    Ok(Ok(serde_json::from_value(output.clone())?))
                }
                ActivityOutcome::Failed { error } => Ok(Err(error.clone())),
            };
        }

        tracing::debug!(
            instance_id = %self.instance_id,
            activity = name,
            sequence,
            "Executing activity"
        );
        let result = self.retry.run(name, f).await;

        let outcome = match &result {
            Ok(value) => ActivityOutcome::Succeeded {
                output: serde_json::to_value(value)?,
            },
            Err(error) => {
                tracing::warn!(
                    instance_id = %self.instance_id,
                    activity = name,
                    error = %error,
                    "Activity failed"
                );
                ActivityOutcome::Failed {
                    error: error.clone(),
                }
            }
        };
        self.store.append_checkpoint(
            &self.instance_id,
            &Checkpoint::new(sequence, name, outcome),
        )?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::durable::checkpoint::{OrchestrationInput, OrchestrationInstance};
    use crate::durable::store::{CheckpointStore, InMemoryCheckpointStore};
    use runmedic_types::{BearerCredential, InspectionTarget};

    fn store_with_instance(id: &str) -> Arc<InMemoryCheckpointStore> {
        let store = Arc::new(InMemoryCheckpointStore::new());
        store
            .create_instance(&OrchestrationInstance::pending(
                id,
                OrchestrationInput::new(
                    InspectionTarget::new("s", "g", "w"),
                    BearerCredential::from_token("t"),
                ),
            ))
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_executes_and_journals() {
        let store = store_with_instance("i");
        let mut ctx = OrchestrationContext::new("i", store.clone(), vec![], RetryPolicy::no_retry());

        let value: u32 = ctx
            .call_activity("one", || async { Ok(7u32) })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value, 7);

        let failed: Result<u32, _> = ctx
            .call_activity("two", || async { Err(ActivityFailure::permanent("nope")) })
            .await
            .unwrap();
        assert_eq!(failed.unwrap_err().message, "nope");

        let journal = store.load_checkpoints("i").unwrap();
        assert_eq!(journal.len(), 2);
        assert_eq!(journal[1].activity, "two");
        assert_eq!(ctx.calls_made(), 2);
    }

    #[tokio::test]
    async fn test_replay_skips_execution() {
        let store = store_with_instance("i");
        let history = vec![
            Checkpoint::new(0, "one", ActivityOutcome::Succeeded {
                output: serde_json::json!(41),
            }),
            Checkpoint::new(1, "two", ActivityOutcome::Failed {
                error: ActivityFailure::permanent("recorded"),
            }),
        ];
        let mut ctx = OrchestrationContext::new("i", store.clone(), history, RetryPolicy::no_retry());
        let executions = &AtomicU32::new(0);

        assert!(ctx.is_replaying());
        let one: u32 = ctx
            .call_activity("one", move || async move {
                executions.fetch_add(1, Ordering::SeqCst);
                Ok(0u32)
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(one, 41);

        let two: Result<u32, _> = ctx
            .call_activity("two", move || async move {
                executions.fetch_add(1, Ordering::SeqCst);
                Ok(0u32)
            })
            .await
            .unwrap();
        assert_eq!(two.unwrap_err().message, "recorded");
        assert!(!ctx.is_replaying());

        assert_eq!(executions.load(Ordering::SeqCst), 0);
        assert!(store.load_checkpoints("i").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_divergent_replay_is_non_deterministic() {
        let store = store_with_instance("i");
        let history = vec![Checkpoint::new(0, "one", ActivityOutcome::Succeeded {
            output: serde_json::json!(1),
        })];
        let mut ctx = OrchestrationContext::new("i", store, history, RetryPolicy::no_retry());

        let err = ctx
            .call_activity("other", || async { Ok(1u32) })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrchestrationError::NonDeterministic { sequence: 0, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_before_journaling() {
        let store = store_with_instance("i");
        let mut ctx = OrchestrationContext::new(
            "i",
            store.clone(),
            vec![],
            RetryPolicy::new(3, std::time::Duration::from_millis(10), 2.0),
        );
        let attempts = &AtomicU32::new(0);

        let value: u32 = ctx
            .call_activity("flaky", move || async move {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ActivityFailure::transient("503"))
                } else {
                    Ok(5u32)
                }
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value, 5);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);

        let journal = store.load_checkpoints("i").unwrap();
        assert_eq!(journal.len(), 1);
        assert!(matches!(journal[0].outcome, ActivityOutcome::Succeeded { .. }));
    }
}

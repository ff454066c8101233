//! Retry policy applied to activity executions.

use std::future::Future;
use std::time::Duration;

use runmedic_types::config_defaults;

use super::checkpoint::ActivityFailure;

/// Exponential backoff for transient activity failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. At least one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub first_retry_interval: Duration,
    /// Multiplier applied to the delay after each retry.
    pub backoff_coefficient: f64,
    /// Upper bound on any single delay.
    pub max_retry_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: config_defaults::ACTIVITY_MAX_ATTEMPTS,
            first_retry_interval: config_defaults::first_retry_interval(),
            backoff_coefficient: config_defaults::BACKOFF_COEFFICIENT,
            max_retry_interval: config_defaults::max_retry_interval(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, first_retry_interval: Duration, backoff_coefficient: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            first_retry_interval,
            backoff_coefficient: if backoff_coefficient.is_finite() && backoff_coefficient >= 1.0 {
                backoff_coefficient
            } else {
                1.0
            },
            max_retry_interval: config_defaults::max_retry_interval(),
        }
    }

    pub fn with_max_retry_interval(mut self, max: Duration) -> Self {
        self.max_retry_interval = max;
        self
    }

    /// A single attempt.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, 1.0)
    }

    /// Delay before retry number `retry` (1-based), never above
    /// `max_retry_interval`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        if self.first_retry_interval.is_zero() {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs =
            self.first_retry_interval.as_secs_f64() * self.backoff_coefficient.powi(exponent);
        Duration::try_from_secs_f64(secs)
            .unwrap_or(self.max_retry_interval)
            .min(self.max_retry_interval)
    }

    /// Run `f`, retrying transient failures.
    ///
    /// Permanent failures return immediately. After the last attempt the final
    /// failure is returned.
    pub async fn run<T, F, Fut>(&self, activity: &str, mut f: F) -> Result<T, ActivityFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ActivityFailure>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match f().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.transient || attempt >= max_attempts => return Err(e),
                Err(e) => {
                    let backoff = self.delay_for(attempt);
                    tracing::warn!(
                        activity,
                        attempt,
                        max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Activity failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_delays() {
        let policy = RetryPolicy::new(4, Duration::from_millis(500), 2.0);
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_delay_saturates_at_max() {
        let policy = RetryPolicy::new(100, Duration::from_millis(500), 2.0);
        assert_eq!(policy.delay_for(70), config_defaults::max_retry_interval());
        assert_eq!(policy.delay_for(u32::MAX), config_defaults::max_retry_interval());

        let policy = RetryPolicy::new(u32::MAX, Duration::from_secs(u64::MAX), 10.0)
            .with_max_retry_interval(Duration::from_secs(30));
        assert_eq!(policy.delay_for(1), Duration::from_secs(30));
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn test_zero_interval_stays_zero() {
        let policy = RetryPolicy::new(10, Duration::ZERO, 2.0);
        assert_eq!(policy.delay_for(1000), Duration::ZERO);
    }

    #[test]
    fn test_sanitized_construction() {
        let policy = RetryPolicy::new(0, Duration::from_millis(10), f64::NAN);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.backoff_coefficient, 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_retried_until_success() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy::default();
        let result = policy
            .run("op", move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(ActivityFailure::transient("503"))
                } else {
                    Ok(n)
                }
            })
            .await;
        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_gives_up_after_max_attempts() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(100), 2.0);
        let result: Result<(), _> = policy
            .run("op", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ActivityFailure::transient("timeout"))
            })
            .await;
        assert_eq!(result.unwrap_err().message, "timeout");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_not_retried() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = RetryPolicy::default()
            .run("op", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ActivityFailure::permanent("404"))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

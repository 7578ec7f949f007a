//! Bounded exponential backoff around single remote calls.
//!
//! Every call the engine makes to the object store goes through
//! [`RetryPolicy::run`]. Whether an error is worth retrying is decided by a
//! caller-supplied predicate; by default only [`StoreError::Cancelled`] and
//! [`StoreError::Transient`] are retried.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::config::RetryConfig;
use crate::error::StoreError;

/// Decides whether a failed call should be attempted again.
pub type RetryPredicate = Arc<dyn Fn(&StoreError) -> bool + Send + Sync>;

/// Retry settings plus the predicate selecting retryable errors.
#[derive(Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    should_retry: RetryPredicate,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Policy retrying cancellations and transient errors.
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self::with_predicate(config, StoreError::is_retryable)
    }

    /// Policy with a custom retry predicate.
    pub fn with_predicate(
        config: RetryConfig,
        should_retry: impl Fn(&StoreError) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            config,
            should_retry: Arc::new(should_retry),
        }
    }

    /// The retry settings.
    #[must_use]
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Delay slept after the `attempt`-th failure (1-based).
    ///
    /// `min(base * 2^(attempt - 1), max)`: non-decreasing in `attempt` and
    /// never above the cap.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use ruststack_transfer_core::RetryPolicy;
    /// use ruststack_transfer_core::config::RetryConfig;
    ///
    /// let policy = RetryPolicy::new(
    ///     RetryConfig::builder().base_delay_ms(100).max_delay_ms(250).build(),
    /// );
    /// assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
    /// assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
    /// assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(250));
    /// ```
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1u64
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u64::MAX);
        let delay = self.config.base_delay_ms.saturating_mul(factor);
        Duration::from_millis(delay.min(self.config.max_delay_ms))
    }

    /// Run `call` until it succeeds, fails with a non-retryable error, or
    /// the attempt budget is spent. The last error is returned as-is.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < max_attempts && (self.should_retry)(&err) => {
                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        operation,
                        attempt,
                        max_attempts,
                        delay = ?delay,
                        error = %err,
                        "retrying object store call"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(
            RetryConfig::builder()
                .max_attempts(max_attempts)
                .base_delay_ms(1)
                .max_delay_ms(2)
                .build(),
        )
    }

    #[test]
    fn test_should_grow_delay_monotonically_up_to_cap() {
        let policy = RetryPolicy::new(
            RetryConfig::builder()
                .base_delay_ms(50)
                .max_delay_ms(1_000)
                .build(),
        );
        let delays: Vec<Duration> = (1..=40).map(|a| policy.delay_for_attempt(a)).collect();
        assert!(delays.windows(2).all(|w| w[0] <= w[1]));
        assert!(delays.iter().all(|d| *d <= Duration::from_millis(1_000)));
        assert_eq!(delays[0], Duration::from_millis(50));
        assert_eq!(delays[39], Duration::from_millis(1_000));
    }

    #[test]
    fn test_should_return_first_success_without_sleeping() {
        let policy = fast_policy(3);
        let calls = AtomicU32::new(0);

        let value = tokio_test::assert_ok!(tokio_test::block_on(policy.run(
            "head_object",
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, StoreError>("etag")
            }
        )));

        assert_eq!(value, "etag");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_should_retry_cancelled_call_until_success() {
        let policy = fast_policy(3);
        let calls = AtomicU32::new(0);

        let result = policy
            .run("head_object", || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(StoreError::Cancelled("reset".to_owned()))
                } else {
                    Ok(42)
                }
            })
            .await;

        assert_eq!(result.ok(), Some(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_should_surface_cancellation_after_budget() {
        let policy = fast_policy(2);
        let calls = AtomicU32::new(0);

        let result: Result<(), StoreError> = policy
            .run("copy_object", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(StoreError::Cancelled("reset".to_owned()))
            })
            .await;

        assert!(matches!(result, Err(StoreError::Cancelled(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_should_not_retry_logical_errors() {
        let policy = fast_policy(5);
        let calls = AtomicU32::new(0);

        let result: Result<(), StoreError> = policy
            .run("head_object", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(StoreError::NotFound {
                    bucket: "b".to_owned(),
                    key: "k".to_owned(),
                })
            })
            .await;

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_should_honor_custom_predicate() {
        let policy = RetryPolicy::with_predicate(
            RetryConfig::builder()
                .max_attempts(4)
                .base_delay_ms(1)
                .max_delay_ms(1)
                .build(),
            |err| matches!(err, StoreError::Service { code, .. } if code == "SlowDown"),
        );
        let calls = AtomicU32::new(0);

        let result: Result<(), StoreError> = policy
            .run("delete_objects", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(StoreError::service("SlowDown", "reduce your request rate"))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_should_treat_zero_attempts_as_one() {
        let policy = fast_policy(0);
        let calls = AtomicU32::new(0);

        let _ = policy
            .run("head_object", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(StoreError::Transient("503".to_owned()))
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

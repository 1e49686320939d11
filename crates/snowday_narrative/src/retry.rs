//! Bounded retry with linear backoff.

use snowday_error::{GenerationError, GenerationErrorKind, SnowdayResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// How often and how patiently to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: usize,
    /// Backoff unit
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::linear(3, Duration::from_millis(500))
    }
}

impl RetryPolicy {
    /// Linear backoff: after failed attempt `k` wait `k × delay`.
    pub fn linear(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Wait after the given 1-based failed attempt.
    pub fn backoff(&self, attempt: usize) -> Duration {
        self.delay.saturating_mul(attempt as u32)
    }
}

/// Run `operation` until `accept` turns its output into a value.
///
/// `accept` validates the raw output; returning a retryable error (empty or
/// malformed content, transient transport failures) schedules another
/// attempt. Non-retryable errors end the loop immediately. When every attempt
/// fails the result is `GenerationErrorKind::RetryBudgetExhausted` naming
/// `label` and the last failure.
pub async fn retry<R, T, F, Fut, A>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
    mut accept: A,
) -> SnowdayResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SnowdayResult<R>>,
    A: FnMut(R) -> SnowdayResult<T>,
{
    let mut last_error = String::new();

    for attempt in 1..=policy.max_attempts {
        debug!(operation = label, attempt, "Executing operation");

        match operation().await.and_then(&mut accept) {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation = label, attempt, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if !err.is_retryable() => {
                warn!(operation = label, attempt, error = %err, "Error is not retryable, failing immediately");
                return Err(err);
            }
            Err(err) => {
                warn!(operation = label, attempt, error = %err, "Attempt failed");
                last_error = err.to_string();
                if attempt < policy.max_attempts {
                    let backoff = policy.backoff(attempt);
                    debug!(backoff_ms = backoff.as_millis() as u64, "Retrying after failure");
                    sleep(backoff).await;
                }
            }
        }
    }

    warn!(operation = label, attempts = policy.max_attempts, "All retry attempts exhausted");
    Err(GenerationError::new(GenerationErrorKind::RetryBudgetExhausted {
        operation: label.to_string(),
        attempts: policy.max_attempts,
        last_error,
    })
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use snowday_error::{ConfigError, SnowdayErrorKind};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn malformed() -> snowday_error::SnowdayError {
        GenerationError::new(GenerationErrorKind::MalformedResponse("not a list".into())).into()
    }

    #[tokio::test(start_paused = true)]
    async fn test_linear_backoff_between_attempts() {
        let policy = RetryPolicy::linear(3, Duration::from_millis(500));
        let start = tokio::time::Instant::now();

        let result: SnowdayResult<()> =
            retry(&policy, "misspellings", || async { Err(malformed()) }, Ok).await;

        // 1 × 500ms after attempt 1, 2 × 500ms after attempt 2, none after the last
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
        match result.unwrap_err().kind() {
            SnowdayErrorKind::Generation(e) => match &e.kind {
                GenerationErrorKind::RetryBudgetExhausted {
                    operation,
                    attempts,
                    last_error,
                } => {
                    assert_eq!(operation, "misspellings");
                    assert_eq!(*attempts, 3);
                    assert!(last_error.contains("not a list"));
                }
                other => panic!("unexpected kind {other:?}"),
            },
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_failure_is_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let value = retry(
            &RetryPolicy::linear(3, Duration::from_millis(10)),
            "answers",
            || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok(n) }
            },
            |n| if n == 0 { Err(malformed()) } else { Ok(n * 10) },
        )
        .await
        .unwrap();

        assert_eq!(value, 10);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_fast() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result: SnowdayResult<()> = retry(
            &RetryPolicy::default(),
            "question",
            || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(ConfigError::new("missing key").into()) }
            },
            Ok,
        )
        .await;

        assert!(matches!(result.unwrap_err().kind(), SnowdayErrorKind::Config(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

//! Bounded exponential backoff for model calls.

use crate::types::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Upper bound of the random delay added to each wait
    pub jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 2000,
            max_backoff_ms: 8000,
            jitter_ms: 250,
        }
    }
}

impl RetryPolicy {
    /// A policy that never waits and never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
            jitter_ms: 0,
        }
    }

    /// Wait before retry number `retry_index` (0-based), without jitter.
    pub fn backoff_ms(&self, retry_index: u32) -> u64 {
        let cap = self.max_backoff_ms.max(self.initial_backoff_ms);
        let shift = retry_index.min(20);
        let factor = 1u64.checked_shl(shift).unwrap_or(u64::MAX);
        self.initial_backoff_ms.saturating_mul(factor).min(cap)
    }

    fn delay(&self, retry_index: u32) -> Duration {
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=self.jitter_ms)
        };
        Duration::from_millis(self.backoff_ms(retry_index).saturating_add(jitter))
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// attempt budget is spent. Only [`crate::AppError::is_retryable`] errors are retried.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < attempts => {
                let wait = policy.delay(attempt - 1);
                tracing::warn!(
                    operation = label,
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    "rate limited, backing off: {}",
                    err
                );
                tokio::time::sleep(wait).await;
            }
            Err(err) => {
                tracing::debug!(operation = label, attempt, "giving up: {}", err);
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AppError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_ms(0), 2000);
        assert_eq!(policy.backoff_ms(1), 4000);
        assert_eq!(policy.backoff_ms(2), 8000);
        assert_eq!(policy.backoff_ms(10), 8000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_rate_limit_then_succeeds() {
        let calls = &AtomicU32::new(0);
        let result = with_retry(&RetryPolicy::default(), "lookup", || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(AppError::RateLimited("429".into()))
            } else {
                Ok("done")
            }
        })
        .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_after_max_attempts() {
        let calls = &AtomicU32::new(0);
        let result: Result<()> = with_retry(&RetryPolicy::default(), "lookup", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::RateLimited("quota".into()))
        })
        .await;
        assert!(matches!(result, Err(AppError::RateLimited(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_does_not_retry_transport_errors() {
        let calls = &AtomicU32::new(0);
        let result: Result<()> = with_retry(&RetryPolicy::default(), "lookup", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::Transport("reset".into()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

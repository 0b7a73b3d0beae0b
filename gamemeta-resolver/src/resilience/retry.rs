//! Retry policy: fixed attempt count with a fixed inter-attempt delay
//!
//! Every failure except `NotFound` is retried. Exhausting the attempts
//! surfaces the last failure unchanged.

use crate::error::SourceResult;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct RetryPolicy {
    name: Arc<str>,
    max_attempts: u32,
    wait: Duration,
}

impl RetryPolicy {
    pub fn new(name: impl Into<Arc<str>>, max_attempts: u32, wait: Duration) -> Self {
        Self {
            name: name.into(),
            max_attempts: max_attempts.max(1),
            wait,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Invoke `operation` until it succeeds, fails terminally, or runs out of attempts
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> SourceResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = SourceResult<T>>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            if attempt > 1 {
                debug!(guard = %self.name, attempt, "Retrying upstream call");
            }

            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) if attempt >= self.max_attempts => {
                    warn!(
                        guard = %self.name,
                        attempt,
                        error = %err,
                        "Upstream call failed: attempts exhausted"
                    );
                    return Err(err);
                }
                Err(err) => {
                    warn!(
                        guard = %self.name,
                        attempt,
                        max_attempts = self.max_attempts,
                        wait_ms = self.wait.as_millis(),
                        error = %err,
                        "Upstream call failed, will retry after delay"
                    );
                    tokio::time::sleep(self.wait).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new("test", attempts, Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_succeeds_first_attempt() {
        let calls = AtomicU32::new(0);
        let result = policy(3)
            .execute(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, SourceError>(42)
            })
            .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_from_transient_failure() {
        let calls = AtomicU32::new(0);
        let result = policy(3)
            .execute(|| async {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(SourceError::Network(format!("attempt {}", n)))
                } else {
                    Ok(n)
                }
            })
            .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_surfaces_last_error() {
        let calls = AtomicU32::new(0);
        let result: SourceResult<()> = policy(3)
            .execute(|| async {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Err(SourceError::Parse(format!("attempt {}", n)))
            })
            .await;

        assert_eq!(result, Err(SourceError::Parse("attempt 3".to_string())));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: SourceResult<()> = policy(3)
            .execute(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(SourceError::NotFound("gone".into()))
            })
            .await;

        assert!(matches!(result, Err(SourceError::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

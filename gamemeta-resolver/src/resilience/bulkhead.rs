//! Bulkhead: admission control bounding concurrently in-flight calls

use crate::error::{SourceError, SourceResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::warn;

#[derive(Clone)]
pub struct Bulkhead {
    name: Arc<str>,
    slots: Arc<Semaphore>,
    max_concurrent_calls: usize,
    max_wait: Duration,
}

impl Bulkhead {
    pub fn new(name: impl Into<Arc<str>>, max_concurrent_calls: usize, max_wait: Duration) -> Self {
        let max_concurrent_calls = max_concurrent_calls.max(1);
        Self {
            name: name.into(),
            slots: Arc::new(Semaphore::new(max_concurrent_calls)),
            max_concurrent_calls,
            max_wait,
        }
    }

    pub fn max_concurrent_calls(&self) -> usize {
        self.max_concurrent_calls
    }

    /// Slots currently free
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    /// Run `operation` while holding a slot
    ///
    /// Waits up to the configured maximum for a slot, then fails with
    /// `CapacityExceeded`. The slot is released when the call completes.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> SourceResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SourceResult<T>>,
    {
        let _slot = match timeout(self.max_wait, self.slots.acquire()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_closed)) => {
                return Err(SourceError::CapacityExceeded(format!(
                    "bulkhead '{}' is closed",
                    self.name
                )))
            }
            Err(_elapsed) => {
                warn!(
                    guard = %self.name,
                    max_concurrent_calls = self.max_concurrent_calls,
                    max_wait_ms = self.max_wait.as_millis(),
                    "Bulkhead full, giving up"
                );
                return Err(SourceError::CapacityExceeded(format!(
                    "bulkhead '{}' full ({} in flight) after waiting {} ms",
                    self.name,
                    self.max_concurrent_calls,
                    self.max_wait.as_millis()
                )));
            }
        };

        operation().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_bounds_in_flight_calls() {
        let bulkhead = Bulkhead::new("test", 2, Duration::from_secs(5));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let bulkhead = bulkhead.clone();
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            handles.push(tokio::spawn(async move {
                bulkhead
                    .execute(|| async {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        sleep(Duration::from_millis(30)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        Ok(())
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(peak.load(Ordering::SeqCst), 2);
        assert_eq!(bulkhead.available(), 2);
    }

    #[tokio::test]
    async fn test_full_bulkhead_times_out() {
        let bulkhead = Bulkhead::new("test", 1, Duration::from_millis(20));
        let holder = bulkhead.clone();
        let busy = tokio::spawn(async move {
            holder
                .execute(|| async {
                    sleep(Duration::from_millis(300)).await;
                    Ok(())
                })
                .await
        });
        sleep(Duration::from_millis(10)).await;

        let result = bulkhead.execute(|| async { Ok(1) }).await;
        assert!(matches!(result, Err(SourceError::CapacityExceeded(_))));

        busy.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_slot_released_after_failure() {
        let bulkhead = Bulkhead::new("test", 1, Duration::from_millis(50));
        let failed: SourceResult<()> = bulkhead
            .execute(|| async { Err(SourceError::Network("boom".into())) })
            .await;
        assert!(failed.is_err());

        let ok = bulkhead.execute(|| async { Ok(7) }).await;
        assert_eq!(ok, Ok(7));
    }
}

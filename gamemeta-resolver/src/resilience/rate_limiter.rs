//! Rate limiter: fixed permits released every refresh period
//!
//! Time is divided into consecutive windows of `refresh_period`, starting
//! when the limiter is created. Each window holds `limit_for_period`
//! permits. A caller finding the current window exhausted sleeps until the
//! next window opens, provided that happens within its timeout; otherwise it
//! fails with `RateLimitExceeded` without waiting.

use crate::error::{SourceError, SourceResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

#[derive(Clone)]
pub struct RateLimiter {
    name: Arc<str>,
    limit_for_period: u32,
    refresh_period: Duration,
    timeout: Duration,
    window: Arc<Mutex<Window>>,
}

struct Window {
    started_at: Instant,
    remaining: u32,
}

enum Reservation {
    Granted,
    RetryAt(Instant),
}

impl RateLimiter {
    pub fn new(
        name: impl Into<Arc<str>>,
        limit_for_period: u32,
        refresh_period: Duration,
        timeout: Duration,
    ) -> Self {
        let limit_for_period = limit_for_period.max(1);
        let refresh_period = refresh_period.max(Duration::from_millis(1));
        Self {
            name: name.into(),
            limit_for_period,
            refresh_period,
            timeout,
            window: Arc::new(Mutex::new(Window {
                started_at: Instant::now(),
                remaining: limit_for_period,
            })),
        }
    }

    pub fn limit_for_period(&self) -> u32 {
        self.limit_for_period
    }

    pub fn refresh_period(&self) -> Duration {
        self.refresh_period
    }

    /// Wait for a permit, then run `operation`
    pub async fn execute<F, Fut, T>(&self, operation: F) -> SourceResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SourceResult<T>>,
    {
        self.acquire().await?;
        operation().await
    }

    /// Take one permit, sleeping into later windows as needed
    pub async fn acquire(&self) -> SourceResult<()> {
        let deadline = Instant::now() + self.timeout;

        loop {
            match self.try_reserve().await {
                Reservation::Granted => return Ok(()),
                Reservation::RetryAt(next_window) => {
                    if next_window > deadline {
                        return Err(SourceError::RateLimitExceeded(format!(
                            "rate limiter '{}' has no permit within {} ms",
                            self.name,
                            self.timeout.as_millis()
                        )));
                    }
                    debug!(
                        guard = %self.name,
                        sleep_ms = next_window.saturating_duration_since(Instant::now()).as_millis(),
                        "Rate limiting: waiting for next window"
                    );
                    sleep_until(next_window).await;
                }
            }
        }
    }

    async fn try_reserve(&self) -> Reservation {
        let mut window = self.window.lock().await;
        let now = Instant::now();

        let elapsed = now.saturating_duration_since(window.started_at);
        if elapsed >= self.refresh_period {
            let cycles = elapsed.as_nanos() / self.refresh_period.as_nanos();
            let advance = self.refresh_period.as_nanos() * cycles;
            window.started_at += Duration::from_nanos(advance as u64);
            window.remaining = self.limit_for_period;
        }

        if window.remaining > 0 {
            window.remaining -= 1;
            Reservation::Granted
        } else {
            Reservation::RetryAt(window.started_at + self.refresh_period)
        }
    }
}

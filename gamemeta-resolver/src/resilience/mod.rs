//! Resilience guard for upstream calls
//!
//! A [`Guard`] is a fixed pipeline of three policies around one call:
//!
//! ```text
//! retry ─▶ bulkhead ─▶ rate limiter ─▶ operation
//! ```
//!
//! The retry policy is outermost, so every retried attempt re-enters the
//! bulkhead and waits for a fresh rate-limiter permit. Guards are cheap to
//! clone; clones share slots and permits, which lets several adapters that
//! hit the same upstream quota share one guard.

mod bulkhead;
mod rate_limiter;
mod retry;

pub use bulkhead::Bulkhead;
pub use rate_limiter::RateLimiter;
pub use retry::RetryPolicy;

use crate::error::SourceResult;
use gamemeta_common::config::GuardSettings;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct Guard {
    name: Arc<str>,
    bulkhead: Bulkhead,
    limiter: RateLimiter,
    retry: RetryPolicy,
}

impl Guard {
    pub fn new(
        name: impl Into<Arc<str>>,
        bulkhead: Bulkhead,
        limiter: RateLimiter,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            name: name.into(),
            bulkhead,
            limiter,
            retry,
        }
    }

    /// Build all three policies from one config section
    pub fn from_settings(name: &str, settings: &GuardSettings) -> Self {
        let name: Arc<str> = Arc::from(name);
        Self {
            bulkhead: Bulkhead::new(
                Arc::clone(&name),
                settings.max_concurrent_calls,
                Duration::from_millis(settings.max_wait_ms),
            ),
            limiter: RateLimiter::new(
                Arc::clone(&name),
                settings.limit_for_period,
                Duration::from_millis(settings.refresh_period_ms),
                Duration::from_millis(settings.limiter_timeout_ms),
            ),
            retry: RetryPolicy::new(
                Arc::clone(&name),
                settings.max_attempts,
                Duration::from_millis(settings.retry_wait_ms),
            ),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bulkhead(&self) -> &Bulkhead {
        &self.bulkhead
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Run `operation` through retry, bulkhead and rate limiter
    ///
    /// `operation` is invoked once per attempt.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> SourceResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = SourceResult<T>>,
    {
        let operation = &operation;
        self.retry
            .execute(move || async move {
                self.bulkhead
                    .execute(move || self.limiter.execute(operation))
                    .await
            })
            .await
    }
}

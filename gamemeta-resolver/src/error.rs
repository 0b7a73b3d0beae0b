//! Error types for gamemeta-resolver
//!
//! These never reach callers of `fetch_by_title`/`fetch_by_id`; the
//! orchestrator converts them into "this source yielded nothing".

use thiserror::Error;

/// Failure of one upstream call, raised by adapters or the resilience guard
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// Transport failure (connect, timeout, non-success status)
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream payload could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// No rate-limiter permit became available within the configured timeout
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// No bulkhead slot became available within the configured wait
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// Definitive absence; never retried
    #[error("Not found: {0}")]
    NotFound(String),
}

impl SourceError {
    /// Whether the retry policy may re-invoke the call
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SourceError::NotFound(_))
    }
}

/// Result type for upstream calls
pub type SourceResult<T> = Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_not_found_is_terminal() {
        assert!(SourceError::Network("x".into()).is_retryable());
        assert!(SourceError::Parse("x".into()).is_retryable());
        assert!(SourceError::RateLimitExceeded("x".into()).is_retryable());
        assert!(SourceError::CapacityExceeded("x".into()).is_retryable());
        assert!(!SourceError::NotFound("x".into()).is_retryable());
    }

    #[test]
    fn test_display_includes_context() {
        let err = SourceError::Network("GOG catalog returned 503".into());
        assert_eq!(err.to_string(), "Network error: GOG catalog returned 503");
    }
}

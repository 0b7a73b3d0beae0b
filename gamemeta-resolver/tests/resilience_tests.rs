//! Resilience guard integration tests
//!
//! Test IDs:
//! - TC-G-01: Rate limiter paces a burst instead of failing it
//! - TC-G-02: Sources sharing one guard share its quota

mod helpers;

use gamemeta_common::config::GuardSettings;
use gamemeta_resolver::{Guard, MetadataResolver, SourceResult};
use helpers::{record, MockCatalog};
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test]
async fn tc_g_01_fifth_call_waits_for_next_window() {
    let guard = Guard::from_settings(
        "burst",
        &GuardSettings {
            max_concurrent_calls: 8,
            max_wait_ms: 5_000,
            limit_for_period: 4,
            refresh_period_ms: 1_000,
            limiter_timeout_ms: 5_000,
            max_attempts: 1,
            retry_wait_ms: 0,
        },
    );

    let start = Instant::now();
    let mut finished = Vec::new();
    for n in 0..5u32 {
        let result: SourceResult<u32> = guard.execute(|| async move { Ok(n) }).await;
        assert_eq!(result, Ok(n));
        finished.push(start.elapsed());
    }

    assert!(finished[3] < Duration::from_millis(100));
    assert!(finished[4] >= Duration::from_millis(850), "got {:?}", finished[4]);
    assert!(finished[4] < Duration::from_millis(1_500), "got {:?}", finished[4]);
}

#[tokio::test]
async fn tc_g_02_shared_guard_quota_spans_sources() {
    let shared = Guard::from_settings(
        "shared",
        &GuardSettings {
            max_concurrent_calls: 8,
            max_wait_ms: 1_000,
            limit_for_period: 1,
            refresh_period_ms: 1_000,
            limiter_timeout_ms: 50,
            max_attempts: 1,
            retry_wait_ms: 0,
        },
    );
    let first = MockCatalog::returning("first", 1, vec![record("1", "Thief", Some(1998))]);
    let second = MockCatalog::returning("second", 0, vec![record("2", "Thief", Some(2014))]);
    let resolver = MetadataResolver::builder()
        .search_source(first.clone(), shared.clone())
        .search_source(second.clone(), shared)
        .build();

    let results = resolver.fetch_by_title("Thief", &BTreeSet::new(), 10).await;

    // The second source is refused a permit and contributes nothing
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "1");
    assert_eq!(first.calls(), 1);
    assert_eq!(second.calls(), 0);
}

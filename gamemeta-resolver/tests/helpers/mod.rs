//! Test Helper Utilities
//!
//! In-process catalog and detail sources with call counters, plus guards
//! tuned for fast tests. No network access.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use gamemeta_common::config::GuardSettings;
use gamemeta_resolver::{
    CanonicalMetadata, CatalogSource, DetailSource, Guard, RawCandidate, RawDetail, SourceError,
    SourceResult,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Guard with generous limits and a short retry delay
pub fn fast_guard(name: &str) -> Guard {
    Guard::from_settings(
        name,
        &GuardSettings {
            max_concurrent_calls: 8,
            max_wait_ms: 1_000,
            limit_for_period: 1_000,
            refresh_period_ms: 1_000,
            limiter_timeout_ms: 1_000,
            max_attempts: 3,
            retry_wait_ms: 5,
        },
    )
}

/// Record with id, title and optional release year
pub fn record(id: &str, title: &str, year: Option<i32>) -> CanonicalMetadata {
    let mut metadata = CanonicalMetadata::new(id, title);
    metadata.release = year.and_then(|y| Utc.with_ymd_and_hms(y, 1, 1, 0, 0, 0).single());
    metadata
}

#[derive(Clone)]
enum Reply {
    Hits(Vec<CanonicalMetadata>),
    Fail(SourceError),
}

/// Catalog source returning a fixed reply and counting calls
#[derive(Clone)]
pub struct MockCatalog {
    name: &'static str,
    priority: u8,
    reply: Reply,
    calls: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl MockCatalog {
    pub fn returning(name: &'static str, priority: u8, hits: Vec<CanonicalMetadata>) -> Self {
        Self {
            name,
            priority,
            reply: Reply::Hits(hits),
            calls: Arc::new(AtomicUsize::new(0)),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(name: &'static str, priority: u8, error: SourceError) -> Self {
        Self {
            reply: Reply::Fail(error),
            ..Self::returning(name, priority, Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogSource for MockCatalog {
    fn name(&self) -> &'static str {
        self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    async fn search_by_title(&self, title: &str) -> SourceResult<Vec<RawCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(title.to_string());
        match &self.reply {
            Reply::Hits(hits) => Ok(hits
                .iter()
                .cloned()
                .map(|metadata| RawCandidate::new(self.name, metadata))
                .collect()),
            Reply::Fail(error) => Err(error.clone()),
        }
    }
}

/// Detail source backed by a map; unknown ids are a definitive not-found
#[derive(Clone, Default)]
pub struct MockDetail {
    details: Arc<HashMap<String, RawDetail>>,
    failure: Option<SourceError>,
    calls: Arc<AtomicUsize>,
}

impl MockDetail {
    pub fn with(details: Vec<(&str, RawDetail)>) -> Self {
        Self {
            details: Arc::new(
                details
                    .into_iter()
                    .map(|(id, detail)| (id.to_string(), detail))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub fn failing(error: SourceError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DetailSource for MockDetail {
    fn name(&self) -> &'static str {
        "mock-detail"
    }

    async fn fetch_detail(&self, id: &str) -> SourceResult<Option<RawDetail>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(self.details.get(id).cloned())
    }
}

pub fn detail(title: Option<&str>, description: Option<&str>) -> RawDetail {
    RawDetail {
        title: title.map(str::to_string),
        description: description.map(str::to_string),
    }
}

//! Resolution orchestrator
//!
//! [`MetadataResolver`] is the public entry point. It fans a title search out
//! to every registered [`CatalogSource`] through that source's [`Guard`],
//! ranks and deduplicates the pooled candidates, backfills missing
//! descriptions from the [`DetailSource`], and caches both raw hits and
//! resolved records.
//!
//! Both entry points are total: upstream failures are logged and degrade the
//! answer (fewer candidates, a missing field) but are never returned to the
//! caller.
//!
//! # Title search
//! 1. Normalise the query
//! 2. Search all sources concurrently; a failing source contributes nothing
//! 3. Tag candidates with source priority and cache them by source id
//! 4. Platform filter, score, sort, deduplicate, truncate
//! 5. Backfill missing descriptions concurrently
//! 6. Cache and return the records in rank order
//!
//! # Id lookup
//! Resolved cache, then raw cache plus detail fetch, then a one-shot
//! re-search by the detail title.

use crate::cache::{RecencyCache, DEFAULT_CACHE_CAPACITY};
use crate::fuzzy::weighted_ratio;
use crate::normalize::normalize_query;
use crate::ranking::{deduplicate, filter_platforms, Ranker};
use crate::resilience::Guard;
use crate::sources::{
    build_http_client, CatalogSource, DetailSource, GamesDbSource, GogCatalogSource,
    GogProductSource,
};
use crate::types::{CanonicalMetadata, Platform, RawCandidate, RawDetail};
use futures::future::join_all;
use gamemeta_common::config::{ResolverConfig, TieBreakOrder, TomlConfig};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name of the guard shared by the GOG search endpoints
pub const SEARCH_GUARD_NAME: &str = "gog-search";
/// Name of the guard for the GOG product detail endpoint
pub const DETAIL_GUARD_NAME: &str = "gog-detail";

struct SearchBinding {
    source: Arc<dyn CatalogSource>,
    guard: Guard,
}

struct DetailBinding {
    source: Arc<dyn DetailSource>,
    guard: Guard,
}

pub struct MetadataResolver {
    search_sources: Vec<SearchBinding>,
    detail_source: Option<DetailBinding>,
    /// Raw search hits keyed by source id
    raw_cache: RecencyCache<String, RawCandidate>,
    /// Resolved records keyed by canonical id
    resolved_cache: RecencyCache<String, CanonicalMetadata>,
    ranker: Ranker,
    id_fallback_min_score: u8,
    default_max_results: usize,
}

impl MetadataResolver {
    pub fn builder() -> MetadataResolverBuilder {
        MetadataResolverBuilder::default()
    }

    /// Wire the GOG adapters from configuration
    ///
    /// Both search endpoints share one guard since they draw on the same
    /// upstream quota. The detail endpoint gets its own.
    pub fn from_config(config: &TomlConfig) -> gamemeta_common::Result<Self> {
        config.validate()?;
        let client = build_http_client(&config.http)?;

        let search_guard = Guard::from_settings(SEARCH_GUARD_NAME, &config.search_guard);
        let detail_guard = Guard::from_settings(DETAIL_GUARD_NAME, &config.detail_guard);

        let resolver = Self::builder()
            .resolver_config(&config.resolver)
            .search_source(GogCatalogSource::new(client.clone()), search_guard.clone())
            .search_source(GamesDbSource::new(client.clone()), search_guard)
            .detail_source(GogProductSource::new(client), detail_guard)
            .build();

        info!(
            sources = resolver.search_sources.len(),
            cache_capacity = resolver.raw_cache.capacity(),
            "Metadata resolver initialized"
        );
        Ok(resolver)
    }

    /// Platforms this resolver can report
    pub fn supported_platforms(&self) -> BTreeSet<Platform> {
        Platform::ALL.into_iter().collect()
    }

    /// Result count to use when a caller has no preference
    pub fn default_max_results(&self) -> usize {
        self.default_max_results
    }

    /// Resolve a free-text title into ranked, deduplicated records
    ///
    /// An empty `platform_filter` disables platform filtering. Never fails;
    /// returns an empty list when nothing usable came back.
    pub async fn fetch_by_title(
        &self,
        title: &str,
        platform_filter: &BTreeSet<Platform>,
        max_results: usize,
    ) -> Vec<CanonicalMetadata> {
        let query = normalize_query(title);
        if query.is_empty() || max_results == 0 {
            debug!(title = %title, max_results, "Nothing to search for");
            return Vec::new();
        }

        let candidates = self.search_all(&query).await;
        let total = candidates.len();

        let filtered = filter_platforms(candidates, platform_filter);
        let ranked = self.ranker.rank(&query, filtered);
        let mut deduped = deduplicate(ranked);
        deduped.truncate(max_results);

        let records = join_all(
            deduped
                .into_iter()
                .map(|scored| self.backfill_description(scored.candidate.metadata)),
        )
        .await;

        for record in &records {
            self.resolved_cache.put(record.id.clone(), record.clone());
        }

        info!(
            query = %query,
            candidates = total,
            results = records.len(),
            "Title resolution complete"
        );
        records
    }

    /// Resolve a stable id into one record
    ///
    /// Returns `None` when no candidate for `id` could be found by any path.
    pub async fn fetch_by_id(&self, id: &str) -> Option<CanonicalMetadata> {
        if let Some(hit) = self.resolved_cache.get(&id.to_string()) {
            debug!(id = %id, "Resolved cache hit");
            return Some(hit);
        }

        let cached = self.raw_cache.get(&id.to_string());
        let detail = self.fetch_detail(id).await;

        let candidate = match cached {
            Some(candidate) => {
                debug!(id = %id, source = candidate.source, "Raw cache hit");
                Some(candidate)
            }
            None => match detail.as_ref().and_then(|d| d.title.as_deref()) {
                Some(title) => self.search_for_id(id, title).await,
                None => None,
            },
        };

        let Some(candidate) = candidate else {
            info!(id = %id, "No candidate found for id");
            return None;
        };

        let base = candidate.metadata.with_id(id);
        let record = match &detail {
            Some(detail) => base.fill_from(&detail.to_partial(id)),
            None => base,
        };

        self.resolved_cache.put(id.to_string(), record.clone());
        Some(record)
    }

    /// Search every source once, tagging and caching the candidates
    ///
    /// Results keep source registration order, then upstream order.
    async fn search_all(&self, query: &str) -> Vec<RawCandidate> {
        let per_source = join_all(
            self.search_sources
                .iter()
                .map(|binding| self.search_one(binding, query)),
        )
        .await;

        let candidates: Vec<RawCandidate> = per_source.into_iter().flatten().collect();
        for candidate in &candidates {
            self.raw_cache
                .put(candidate.id().to_string(), candidate.clone());
        }
        candidates
    }

    async fn search_one(&self, binding: &SearchBinding, query: &str) -> Vec<RawCandidate> {
        let source = binding.source.as_ref();
        match binding
            .guard
            .execute(|| source.search_by_title(query))
            .await
        {
            Ok(hits) => {
                debug!(source = source.name(), hits = hits.len(), "Source search succeeded");
                hits.into_iter()
                    .map(|hit| hit.with_priority(source.priority()))
                    .collect()
            }
            Err(e) => {
                warn!(source = source.name(), query = %query, error = %e, "Source search failed");
                Vec::new()
            }
        }
    }

    /// Best-effort detail fetch through the detail guard
    async fn fetch_detail(&self, id: &str) -> Option<RawDetail> {
        let binding = self.detail_source.as_ref()?;
        let source = binding.source.as_ref();
        match binding.guard.execute(|| source.fetch_detail(id)).await {
            Ok(Some(detail)) => Some(detail),
            Ok(None) => {
                debug!(source = source.name(), id = %id, "Detail not found");
                None
            }
            Err(e) => {
                warn!(source = source.name(), id = %id, error = %e, "Detail fetch failed");
                None
            }
        }
    }

    async fn backfill_description(&self, record: CanonicalMetadata) -> CanonicalMetadata {
        if record.has_description() {
            return record;
        }
        match self.fetch_detail(&record.id).await {
            Some(detail) => record.fill_from(&detail.to_partial(&record.id)),
            None => record,
        }
    }

    /// Re-search by the detail title and pick the candidate for `id`
    ///
    /// An exact id match wins; otherwise the first best fuzzy match scoring
    /// at least the configured fallback minimum.
    async fn search_for_id(&self, id: &str, title: &str) -> Option<RawCandidate> {
        debug!(id = %id, title = %title, "Searching by detail title");
        let candidates = self.search_all(title).await;

        let found = match candidates.iter().find(|c| c.id() == id) {
            Some(exact) => Some(exact.clone()),
            None => {
                let mut best: Option<(u8, &RawCandidate)> = None;
                for candidate in &candidates {
                    let score = weighted_ratio(title, candidate.title());
                    if best.map_or(true, |(top, _)| score > top) {
                        best = Some((score, candidate));
                    }
                }
                best.filter(|(score, _)| *score >= self.id_fallback_min_score)
                    .map(|(score, candidate)| {
                        debug!(id = %id, matched = %candidate.id(), score, "Fuzzy id fallback");
                        candidate.clone()
                    })
            }
        };

        if let Some(candidate) = &found {
            self.raw_cache.put(id.to_string(), candidate.clone());
        }
        found
    }
}

/// Registers adapters and guards for a [`MetadataResolver`]
pub struct MetadataResolverBuilder {
    search_sources: Vec<SearchBinding>,
    detail_source: Option<DetailBinding>,
    cache_capacity: usize,
    min_score: u8,
    id_fallback_min_score: u8,
    tie_break: TieBreakOrder,
    default_max_results: usize,
}

impl Default for MetadataResolverBuilder {
    fn default() -> Self {
        let defaults = ResolverConfig::default();
        Self {
            search_sources: Vec::new(),
            detail_source: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            min_score: defaults.min_fuzzy_score,
            id_fallback_min_score: defaults.id_fallback_min_score,
            tie_break: defaults.tie_break,
            default_max_results: defaults.default_max_results,
        }
    }
}

impl MetadataResolverBuilder {
    /// Register a search source; sources are queried in registration order
    pub fn search_source(mut self, source: impl CatalogSource + 'static, guard: Guard) -> Self {
        self.search_sources.push(SearchBinding {
            source: Arc::new(source),
            guard,
        });
        self
    }

    pub fn detail_source(mut self, source: impl DetailSource + 'static, guard: Guard) -> Self {
        self.detail_source = Some(DetailBinding {
            source: Arc::new(source),
            guard,
        });
        self
    }

    /// Apply ranking and cache settings from configuration
    pub fn resolver_config(mut self, config: &ResolverConfig) -> Self {
        self.cache_capacity = config.cache_capacity;
        self.min_score = config.min_fuzzy_score;
        self.id_fallback_min_score = config.id_fallback_min_score;
        self.tie_break = config.tie_break;
        self.default_max_results = config.default_max_results;
        self
    }

    pub fn tie_break(mut self, tie_break: TieBreakOrder) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn build(self) -> MetadataResolver {
        MetadataResolver {
            search_sources: self.search_sources,
            detail_source: self.detail_source,
            raw_cache: RecencyCache::new(self.cache_capacity),
            resolved_cache: RecencyCache::new(self.cache_capacity),
            ranker: Ranker::new(self.min_score, self.tie_break),
            id_fallback_min_score: self.id_fallback_min_score,
            default_max_results: self.default_max_results,
        }
    }
}

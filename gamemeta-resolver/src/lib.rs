//! gamemeta-resolver - game metadata resolution core
//!
//! Resolves free-text titles and stable ids into canonical metadata by
//! querying several read-only catalog services and reconciling their
//! overlapping results into one ranked, deduplicated answer.
//!
//! **Layers:**
//! - [`resilience`]: bulkhead, rate limiter and retry around each upstream call
//! - [`cache`]: bounded recency cache for raw and resolved records
//! - [`sources`]: catalog and detail adapters behind async traits
//! - [`ranking`] / [`fuzzy`]: scoring, tie-break ordering, duplicate merge
//! - [`resolver`]: the [`MetadataResolver`] entry point

pub mod cache;
pub mod error;
pub mod fuzzy;
pub mod normalize;
pub mod ranking;
pub mod resilience;
pub mod resolver;
pub mod sources;
pub mod taxonomy;
pub mod types;

pub use crate::error::{SourceError, SourceResult};
pub use crate::resilience::Guard;
pub use crate::resolver::{MetadataResolver, MetadataResolverBuilder};
pub use crate::sources::{CatalogSource, DetailSource};
pub use crate::types::{CanonicalMetadata, Platform, RawCandidate, RawDetail};

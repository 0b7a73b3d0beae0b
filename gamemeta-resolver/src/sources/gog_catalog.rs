//! GOG store catalog search
//!
//! Endpoint: `GET https://catalog.gog.com/v1/catalog?query=...`
//!
//! Returns store products (games and packs) with platforms, artwork,
//! release date, review rating and tag lists. No descriptions; those come
//! from the product detail endpoint.

use super::{network_error, read_json, CatalogSource};
use crate::error::{SourceError, SourceResult};
use crate::normalize::{collapse_whitespace, fix_url, map_platforms, parse_release_date, rating_to_ten_scale};
use crate::taxonomy::classify;
use crate::types::{CanonicalMetadata, RawCandidate};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const GOG_CATALOG_URL: &str = "https://catalog.gog.com/v1/catalog";
const SOURCE_NAME: &str = "GOG Catalog";
const SEARCH_LIMIT: &str = "50";
const SCREENSHOT_FORMATTER: &str = "1600";

pub struct GogCatalogSource {
    client: Client,
    base_url: String,
}

impl GogCatalogSource {
    pub const PRIORITY: u8 = 1;

    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: GOG_CATALOG_URL.to_string(),
        }
    }

    /// Point the adapter at a different catalog endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl CatalogSource for GogCatalogSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn priority(&self) -> u8 {
        Self::PRIORITY
    }

    async fn search_by_title(&self, title: &str) -> SourceResult<Vec<RawCandidate>> {
        let query = sanitize_query(title);
        debug!(query = %query, "Searching GOG catalog");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("limit", SEARCH_LIMIT),
                ("order", "desc:score"),
                ("productType", "in:game,pack"),
                ("page", "1"),
                ("query", query.as_str()),
            ])
            .send()
            .await
            .map_err(|e| network_error(SOURCE_NAME, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Network(format!(
                "{} returned status {}",
                SOURCE_NAME, status
            )));
        }

        let body: CatalogResponse = read_json(SOURCE_NAME, response).await?;
        debug!(count = body.products.len(), "GOG catalog search complete");
        Ok(body.products.into_iter().map(to_candidate).collect())
    }
}

/// Reduce a title to the character set the catalog search handles well
fn sanitize_query(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '\'' || c == ' ' {
                c
            } else {
                ' '
            }
        })
        .collect();
    collapse_whitespace(&replaced)
}

/// The catalog reports ratings in tenths of a star (0-50)
fn catalog_rating(raw: i64) -> Option<f32> {
    rating_to_ten_scale(raw as f32 / 10.0)
}

fn to_candidate(item: CatalogProduct) -> RawCandidate {
    let labels = item
        .genres
        .iter()
        .chain(item.tags.iter())
        .chain(item.features.iter())
        .map(|label| label.name.as_str());
    let classification = classify(labels);

    let mut metadata = CanonicalMetadata::new(item.id, item.title);
    metadata.platforms = map_platforms(item.operating_systems.iter().map(String::as_str));
    metadata.cover_urls = item.cover_vertical.as_deref().and_then(fix_url).into_iter().collect();
    metadata.header_urls = item
        .galaxy_background_image
        .as_deref()
        .and_then(fix_url)
        .into_iter()
        .collect();
    metadata.screenshot_urls = item
        .screenshots
        .iter()
        .filter_map(|s| fix_url(&s.replace("{formatter}", SCREENSHOT_FORMATTER)))
        .collect();
    metadata.release = item.release_date.as_deref().and_then(parse_release_date);
    metadata.user_rating = item.reviews_rating.and_then(catalog_rating);
    metadata.developed_by = item.developers.into_iter().collect();
    metadata.published_by = item.publishers.into_iter().collect();
    metadata.genres = classification.genres;
    metadata.themes = classification.themes;
    metadata.features = classification.features;

    RawCandidate::new(SOURCE_NAME, metadata)
}

// ============================================================================
// GOG Catalog Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    products: Vec<CatalogProduct>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogProduct {
    id: String,
    title: String,
    #[serde(default)]
    cover_vertical: Option<String>,
    #[serde(default)]
    galaxy_background_image: Option<String>,
    #[serde(default)]
    operating_systems: Vec<String>,
    #[serde(default)]
    developers: Vec<String>,
    #[serde(default)]
    publishers: Vec<String>,
    #[serde(default)]
    genres: Vec<NamedLabel>,
    #[serde(default)]
    tags: Vec<NamedLabel>,
    #[serde(default)]
    features: Vec<NamedLabel>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    screenshots: Vec<String>,
    #[serde(default)]
    reviews_rating: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct NamedLabel {
    name: String,
}

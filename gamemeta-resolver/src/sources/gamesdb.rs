//! GOG GamesDB search
//!
//! Endpoint: `GET https://gamesdb.gog.com/wishlist/wishlisted_games?title=...`
//!
//! GamesDB aggregates records across stores. Hits carry summaries, artwork
//! URL templates and ISO-8601 release timestamps, but no OS list or rating.

use super::{network_error, read_json, CatalogSource};
use crate::error::{SourceError, SourceResult};
use crate::normalize::{fix_url, parse_iso_datetime};
use crate::taxonomy::classify;
use crate::types::{CanonicalMetadata, Platform, RawCandidate};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

const GAMESDB_URL: &str = "https://gamesdb.gog.com/wishlist/wishlisted_games";
const SOURCE_NAME: &str = "GOG GamesDB";

const COVER_FORMATTER: &str = "_glx_vertical_cover";
const IMAGE_FORMATTER: &str = "_1600";
const IMAGE_EXT: &str = "jpg";

pub struct GamesDbSource {
    client: Client,
    base_url: String,
}

impl GamesDbSource {
    pub const PRIORITY: u8 = 0;

    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: GAMESDB_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl CatalogSource for GamesDbSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn priority(&self) -> u8 {
        Self::PRIORITY
    }

    async fn search_by_title(&self, title: &str) -> SourceResult<Vec<RawCandidate>> {
        debug!(query = %title, "Searching GOG GamesDB");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("title", title),
                ("sort", "relevance"),
                ("limit", "50"),
                ("show_only_unreleased", "0"),
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

        let body: GamesDbResponse = read_json(SOURCE_NAME, response).await?;
        debug!(count = body.items.len(), "GOG GamesDB search complete");
        Ok(to_candidates(body.items))
    }
}

/// Map a whole response, suffixing `(slug)` onto titles that repeat in it
fn to_candidates(items: Vec<GamesDbItem>) -> Vec<RawCandidate> {
    let mut title_counts: HashMap<String, usize> = HashMap::new();
    for item in &items {
        *title_counts.entry(item.title.clone()).or_insert(0) += 1;
    }

    items
        .into_iter()
        .map(|item| {
            let repeated = title_counts.get(&item.title).copied().unwrap_or(0) > 1;
            let display_title = match (&item.slug, repeated) {
                (Some(slug), true) => format!("{} ({})", item.title, slug),
                _ => item.title.clone(),
            };
            to_candidate(item, display_title)
        })
        .collect()
}

/// Fill an image URL template with a size suffix and file extension
fn expand_template(url_format: &str, formatter: &str) -> Option<String> {
    fix_url(
        &url_format
            .replace("{formatter}", formatter)
            .replace("{ext}", IMAGE_EXT),
    )
}

fn to_candidate(item: GamesDbItem, title: String) -> RawCandidate {
    let labels = item
        .genres
        .iter()
        .chain(item.themes.iter())
        .chain(item.game_modes.iter())
        .map(|entity| entity.name.as_str());
    let classification = classify(labels);

    let cover = item
        .vertical_cover
        .as_ref()
        .or(item.cover.as_ref())
        .and_then(|image| expand_template(&image.url_format, COVER_FORMATTER));
    let header = item
        .background
        .as_ref()
        .or(item.horizontal_artwork.as_ref())
        .and_then(|image| expand_template(&image.url_format, IMAGE_FORMATTER));

    let description = item
        .summary
        .get("en-US")
        .or_else(|| item.summary.get("*"))
        .filter(|text| !text.trim().is_empty())
        .cloned();

    let mut metadata = CanonicalMetadata::new(item.id, title);
    // GamesDB has no OS data; every record it knows is a PC release
    metadata.platforms = BTreeSet::from([Platform::Windows]);
    metadata.description = description;
    metadata.cover_urls = cover.into_iter().collect();
    metadata.header_urls = header.into_iter().collect();
    metadata.screenshot_urls = item
        .screenshots
        .iter()
        .filter_map(|shot| expand_template(&shot.url_format, IMAGE_FORMATTER))
        .collect();
    metadata.release = item.first_release_date.as_deref().and_then(parse_iso_datetime);
    metadata.developed_by = item.developers.into_iter().map(|e| e.name).collect();
    metadata.published_by = item.publishers.into_iter().map(|e| e.name).collect();
    metadata.genres = classification.genres;
    metadata.themes = classification.themes;
    metadata.features = classification.features;

    RawCandidate::new(SOURCE_NAME, metadata)
}

// ============================================================================
// GamesDB Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct GamesDbResponse {
    #[serde(default)]
    items: Vec<GamesDbItem>,
}

#[derive(Debug, Deserialize)]
struct GamesDbItem {
    id: String,
    title: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    first_release_date: Option<String>,
    #[serde(default)]
    developers: Vec<Entity>,
    #[serde(default)]
    publishers: Vec<Entity>,
    #[serde(default)]
    genres: Vec<Entity>,
    #[serde(default)]
    themes: Vec<Entity>,
    #[serde(default)]
    game_modes: Vec<Entity>,
    #[serde(default)]
    summary: HashMap<String, String>,
    #[serde(default)]
    screenshots: Vec<Image>,
    #[serde(default)]
    cover: Option<Image>,
    #[serde(default)]
    vertical_cover: Option<Image>,
    #[serde(default)]
    background: Option<Image>,
    #[serde(default)]
    horizontal_artwork: Option<Image>,
}

#[derive(Debug, Deserialize)]
struct Entity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Image {
    url_format: String,
}

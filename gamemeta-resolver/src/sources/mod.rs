//! Catalog source adapters
//!
//! One adapter per upstream service. The orchestrator only relies on the
//! two traits below; wire formats stay inside each adapter.
//!
//! # Adapters
//! 1. [`GogCatalogSource`] - GOG store catalog search (priority 1)
//! 2. [`GamesDbSource`] - GOG GamesDB search (priority 0)
//! 3. [`GogProductSource`] - GOG product detail lookup

mod gamesdb;
mod gog_catalog;
mod gog_product;

pub use gamesdb::GamesDbSource;
pub use gog_catalog::GogCatalogSource;
pub use gog_product::GogProductSource;

use crate::error::{SourceError, SourceResult};
use crate::types::{RawCandidate, RawDetail};
use async_trait::async_trait;
use gamemeta_common::config::HttpConfig;
use reqwest::{header, Client};

/// Upstream that can search by free-text title
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Source name for logging and provenance
    fn name(&self) -> &'static str;

    /// Fixed tie-break rank; higher wins
    fn priority(&self) -> u8;

    /// Search the upstream catalog
    ///
    /// # Errors
    /// `Network` on transport failure, `Parse` on a malformed payload
    async fn search_by_title(&self, title: &str) -> SourceResult<Vec<RawCandidate>>;
}

/// Upstream that can fetch authoritative detail by id
#[async_trait]
pub trait DetailSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetch detail for `id`; `Ok(None)` on a definitive not-found
    async fn fetch_detail(&self, id: &str) -> SourceResult<Option<RawDetail>>;
}

/// Build the shared HTTP client for all GOG adapters
pub fn build_http_client(http: &HttpConfig) -> gamemeta_common::Result<Client> {
    let user_agent = http.user_agent();
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::USER_AGENT,
        header::HeaderValue::from_str(&user_agent).map_err(|e| {
            gamemeta_common::Error::Config(format!("Invalid user agent '{}': {}", user_agent, e))
        })?,
    );

    Client::builder()
        .timeout(http.request_timeout())
        .connect_timeout(http.connect_timeout())
        .default_headers(headers)
        .build()
        .map_err(|e| gamemeta_common::Error::Internal(format!("Failed to build HTTP client: {}", e)))
}

pub(crate) fn network_error(source: &str, err: reqwest::Error) -> SourceError {
    SourceError::Network(format!("{} request failed: {}", source, err))
}

pub(crate) fn parse_error(source: &str, err: impl std::fmt::Display) -> SourceError {
    SourceError::Parse(format!("Failed to parse {} response: {}", source, err))
}

/// Decode a JSON body, reporting decode failures as `Parse`
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    source: &str,
    response: reqwest::Response,
) -> SourceResult<T> {
    let body = response.bytes().await.map_err(|e| network_error(source, e))?;
    serde_json::from_slice(&body).map_err(|e| parse_error(source, e))
}

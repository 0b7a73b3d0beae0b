//! GOG product detail lookup
//!
//! Endpoint: `GET https://api.gog.com/v2/games/{id}`
//!
//! Used for authoritative descriptions and for the product title when a
//! lookup by id has no cached search hit to build on.

use super::{network_error, read_json, DetailSource};
use crate::error::{SourceError, SourceResult};
use crate::normalize::strip_html;
use crate::types::RawDetail;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

const GOG_PRODUCT_URL: &str = "https://api.gog.com/v2/games";
const SOURCE_NAME: &str = "GOG Product";

pub struct GogProductSource {
    client: Client,
    base_url: String,
}

impl GogProductSource {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: GOG_PRODUCT_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl DetailSource for GogProductSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch_detail(&self, id: &str) -> SourceResult<Option<RawDetail>> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), id);
        debug!(id = %id, "Fetching GOG product detail");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| network_error(SOURCE_NAME, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!(id = %id, "GOG product not found");
                Ok(None)
            }
            status if status.is_success() => {
                let product: ProductResponse = read_json(SOURCE_NAME, response).await?;
                Ok(Some(product.into_detail()))
            }
            status => Err(SourceError::Network(format!(
                "{} returned status {} for {}",
                SOURCE_NAME, status, id
            ))),
        }
    }
}

// ============================================================================
// GOG Product Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<Description>,
    #[serde(default, rename = "_embedded")]
    embedded: Option<Embedded>,
}

/// The API has shipped both a plain HTML string and a lead/full object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Description {
    Html(String),
    Parts {
        #[serde(default)]
        lead: Option<String>,
        #[serde(default)]
        full: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct Embedded {
    #[serde(default)]
    product: Option<EmbeddedProduct>,
}

#[derive(Debug, Deserialize)]
struct EmbeddedProduct {
    #[serde(default)]
    title: Option<String>,
}

impl ProductResponse {
    fn into_detail(self) -> RawDetail {
        let title = self
            .embedded
            .and_then(|e| e.product)
            .and_then(|p| p.title)
            .or(self.title)
            .filter(|t| !t.trim().is_empty());

        let html = self.description.and_then(|d| match d {
            Description::Html(html) => Some(html),
            Description::Parts { lead, full } => full.or(lead),
        });
        let description = html
            .map(|h| strip_html(&h))
            .filter(|text| !text.is_empty());

        RawDetail { title, description }
    }
}

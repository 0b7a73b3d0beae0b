//! Core record types
//!
//! - [`CanonicalMetadata`]: the resolved, source-agnostic record
//! - [`RawCandidate`]: one upstream search hit tagged with its source priority
//! - [`RawDetail`]: the authoritative fields returned by a detail endpoint
//!
//! Records are treated as immutable values. Merging never mutates in place:
//! [`CanonicalMetadata::fill_from`] returns a new value in which only the
//! fields that were empty in the base have been populated.

use crate::taxonomy::{Feature, Genre, Theme};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Operating system a game runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
    Mac,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Windows, Platform::Linux, Platform::Mac];

    /// Map a raw operating-system label; unrecognised labels yield `None`
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "windows" => Some(Platform::Windows),
            "linux" => Some(Platform::Linux),
            "mac" | "osx" => Some(Platform::Mac),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::Mac => "mac",
        };
        f.write_str(name)
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::from_label(s).ok_or_else(|| format!("unknown platform '{}'", s))
    }
}

/// Resolved metadata for one game
///
/// Set-valued fields use the empty set for "absent".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalMetadata {
    /// Stable identifier defined by the originating source
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub platforms: BTreeSet<Platform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub cover_urls: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub header_urls: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub screenshot_urls: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<DateTime<Utc>>,
    /// Normalised to a 0-10 scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<f32>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub developed_by: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub published_by: BTreeSet<String>,
    #[serde(default)]
    pub genres: BTreeSet<Genre>,
    #[serde(default)]
    pub themes: BTreeSet<Theme>,
    #[serde(default)]
    pub features: BTreeSet<Feature>,
}

impl CanonicalMetadata {
    /// Create a record carrying only an id and a title
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            platforms: BTreeSet::new(),
            description: None,
            cover_urls: BTreeSet::new(),
            header_urls: BTreeSet::new(),
            screenshot_urls: BTreeSet::new(),
            release: None,
            user_rating: None,
            developed_by: BTreeSet::new(),
            published_by: BTreeSet::new(),
            genres: BTreeSet::new(),
            themes: BTreeSet::new(),
            features: BTreeSet::new(),
        }
    }

    /// Same record under a different identifier
    pub fn with_id(self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..self
        }
    }

    /// Whether a non-blank description is present
    pub fn has_description(&self) -> bool {
        has_text(&self.description)
    }

    pub fn release_year(&self) -> Option<i32> {
        self.release.map(|r| r.year())
    }

    /// Fill-only merge: populate fields that are empty here from `other`
    ///
    /// The identifier is never taken from `other`. Populated fields are kept
    /// as they are, so `a.fill_from(&b).fill_from(&c)` never loses a value
    /// that `a` or `b` supplied.
    pub fn fill_from(&self, other: &CanonicalMetadata) -> CanonicalMetadata {
        CanonicalMetadata {
            id: self.id.clone(),
            title: if self.title.trim().is_empty() {
                other.title.clone()
            } else {
                self.title.clone()
            },
            platforms: fill_set(&self.platforms, &other.platforms),
            description: if self.has_description() {
                self.description.clone()
            } else if other.has_description() {
                other.description.clone()
            } else {
                self.description.clone()
            },
            cover_urls: fill_set(&self.cover_urls, &other.cover_urls),
            header_urls: fill_set(&self.header_urls, &other.header_urls),
            screenshot_urls: fill_set(&self.screenshot_urls, &other.screenshot_urls),
            release: self.release.or(other.release),
            user_rating: self.user_rating.or(other.user_rating),
            developed_by: fill_set(&self.developed_by, &other.developed_by),
            published_by: fill_set(&self.published_by, &other.published_by),
            genres: fill_set(&self.genres, &other.genres),
            themes: fill_set(&self.themes, &other.themes),
            features: fill_set(&self.features, &other.features),
        }
    }

    /// Fill-only merge restricted to cover and header images
    pub fn fill_images_from(&self, other: &CanonicalMetadata) -> CanonicalMetadata {
        CanonicalMetadata {
            cover_urls: fill_set(&self.cover_urls, &other.cover_urls),
            header_urls: fill_set(&self.header_urls, &other.header_urls),
            ..self.clone()
        }
    }
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

fn fill_set<T: Clone + Ord>(base: &BTreeSet<T>, other: &BTreeSet<T>) -> BTreeSet<T> {
    if base.is_empty() {
        other.clone()
    } else {
        base.clone()
    }
}

/// One search hit from a catalog source
#[derive(Debug, Clone, PartialEq)]
pub struct RawCandidate {
    /// Name of the source that produced this hit
    pub source: &'static str,
    /// Tie-break rank of the source; higher wins
    pub priority: u8,
    /// Normalised fields, keyed by the source's own id
    pub metadata: CanonicalMetadata,
}

impl RawCandidate {
    pub fn new(source: &'static str, metadata: CanonicalMetadata) -> Self {
        Self {
            source,
            priority: 0,
            metadata,
        }
    }

    /// Source-defined identifier
    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    pub fn with_priority(self, priority: u8) -> Self {
        Self { priority, ..self }
    }
}

/// Authoritative fields from a detail lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDetail {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl RawDetail {
    /// Partial record used as the fill source when merging into a candidate
    pub fn to_partial(&self, id: &str) -> CanonicalMetadata {
        let mut partial = CanonicalMetadata::new(id, self.title.clone().unwrap_or_default());
        partial.description = self.description.clone().filter(|d| !d.trim().is_empty());
        partial
    }
}

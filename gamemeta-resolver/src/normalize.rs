//! Field normalisation helpers
//!
//! Every function here is total: malformed input degrades a single field to
//! `None` (or drops a label) instead of failing the record.

use crate::types::Platform;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use reqwest::Url;
use std::collections::BTreeSet;

/// Filename-style suffixes stripped from incoming queries, in order
const QUERY_SUFFIXES: [&str; 2] = ["_base", "_game"];

/// Normalise a free-text query before searching and scoring
///
/// Strips known trailing tokens, turns underscores into spaces and collapses
/// whitespace: `"Witcher 3_game"` → `"Witcher 3"`.
pub fn normalize_query(title: &str) -> String {
    let mut stripped = title.trim();
    for suffix in QUERY_SUFFIXES {
        stripped = stripped.strip_suffix(suffix).unwrap_or(stripped);
    }
    collapse_whitespace(&stripped.replace('_', " "))
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Map raw OS labels to platforms, silently dropping unknown ones
pub fn map_platforms<'a>(labels: impl IntoIterator<Item = &'a str>) -> BTreeSet<Platform> {
    labels.into_iter().filter_map(Platform::from_label).collect()
}

/// Parse an upstream release date
///
/// Accepted shapes, tried in order:
/// - bare 4-digit year → Jan 1 of that year, midnight UTC
/// - 10-digit Unix epoch seconds
/// - dotted `yyyy.MM.dd` → midnight UTC
pub fn parse_release_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let all_digits = !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit());

    if all_digits && raw.len() == 4 {
        let year: i32 = raw.parse().ok()?;
        return Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single();
    }

    if all_digits && raw.len() == 10 {
        let seconds: i64 = raw.parse().ok()?;
        return Utc.timestamp_opt(seconds, 0).single();
    }

    NaiveDate::parse_from_str(raw, "%Y.%m.%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse an RFC 3339 / ISO-8601 timestamp into UTC
pub fn parse_iso_datetime(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Complete protocol-relative URLs with `https:` and reject malformed ones
pub fn fix_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let candidate = if raw.starts_with("//") {
        format!("https:{}", raw)
    } else {
        raw.to_string()
    };
    Url::parse(&candidate).ok().map(|url| url.to_string())
}

/// Convert a 0-5 rating to the common 0-10 scale
pub fn rating_to_ten_scale(five_scale: f32) -> Option<f32> {
    if five_scale.is_finite() && (0.0..=5.0).contains(&five_scale) {
        Some(five_scale * 2.0)
    } else {
        None
    }
}

/// Reduce an HTML description to plain text
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }

    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    collapse_whitespace(&decoded)
}

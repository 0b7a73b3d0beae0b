//! Candidate ranking and duplicate merging
//!
//! Candidates from every source are scored against the normalised query,
//! filtered by a minimum score, sorted by a deterministic tie-break chain and
//! then collapsed by a title+year key. Sorting is stable, so candidates that
//! tie on every key keep their input order (source registration order, then
//! upstream order).

use crate::fuzzy::weighted_ratio;
use crate::types::{CanonicalMetadata, Platform, RawCandidate};
use gamemeta_common::config::TieBreakOrder;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// A candidate with its similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: RawCandidate,
    /// 0-100 similarity of the candidate title to the query
    pub score: u8,
    /// Case-insensitive exact title match
    pub exact_match: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Ranker {
    min_score: u8,
    tie_break: TieBreakOrder,
}

impl Ranker {
    pub fn new(min_score: u8, tie_break: TieBreakOrder) -> Self {
        Self {
            min_score,
            tie_break,
        }
    }

    pub fn min_score(&self) -> u8 {
        self.min_score
    }

    /// Score every candidate and keep those at or above the minimum
    pub fn score(&self, query: &str, candidates: Vec<RawCandidate>) -> Vec<ScoredCandidate> {
        let query_folded = query.trim().to_lowercase();
        candidates
            .into_iter()
            .map(|candidate| {
                let score = weighted_ratio(query, candidate.title());
                let exact_match = candidate.title().trim().to_lowercase() == query_folded;
                ScoredCandidate {
                    candidate,
                    score,
                    exact_match,
                }
            })
            .filter(|scored| scored.score >= self.min_score)
            .collect()
    }

    /// Score, filter and sort best-first
    pub fn rank(&self, query: &str, candidates: Vec<RawCandidate>) -> Vec<ScoredCandidate> {
        let total = candidates.len();
        let mut ranked = self.score(query, candidates);
        ranked.sort_by(|a, b| self.compare(a, b));
        debug!(
            query = %query,
            total,
            kept = ranked.len(),
            min_score = self.min_score,
            "Ranked candidates"
        );
        ranked
    }

    /// Best-first ordering: exact match, fuzzy score, then the configured
    /// order of description presence and source priority
    pub fn compare(&self, a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
        let by_description = || {
            b.candidate
                .metadata
                .has_description()
                .cmp(&a.candidate.metadata.has_description())
        };
        let by_priority = || b.candidate.priority.cmp(&a.candidate.priority);

        let primary = b
            .exact_match
            .cmp(&a.exact_match)
            .then_with(|| b.score.cmp(&a.score));

        match self.tie_break {
            TieBreakOrder::DescriptionFirst => primary.then_with(by_description).then_with(by_priority),
            TieBreakOrder::PriorityFirst => primary.then_with(by_priority).then_with(by_description),
        }
    }
}

/// Drop candidates with no platform in `filter`; an empty filter keeps all
pub fn filter_platforms(
    candidates: Vec<RawCandidate>,
    filter: &BTreeSet<Platform>,
) -> Vec<RawCandidate> {
    if filter.is_empty() {
        return candidates;
    }
    candidates
        .into_iter()
        .filter(|c| !c.metadata.platforms.is_disjoint(filter))
        .collect()
}

/// Lowercase alphanumeric title plus release year (`none` when unknown)
pub fn dedup_key(metadata: &CanonicalMetadata) -> String {
    let title: String = metadata
        .title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    match metadata.release_year() {
        Some(year) => format!("{}_{}", title, year),
        None => format!("{}_none", title),
    }
}

/// Keep the first candidate per dedup key, filling its empty cover/header
/// images from later duplicates
pub fn deduplicate(ranked: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    let mut kept: Vec<ScoredCandidate> = Vec::with_capacity(ranked.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for scored in ranked {
        let key = dedup_key(&scored.candidate.metadata);
        match index.get(&key) {
            Some(&position) => {
                let primary = &mut kept[position];
                primary.candidate.metadata = primary
                    .candidate
                    .metadata
                    .fill_images_from(&scored.candidate.metadata);
                debug!(
                    key = %key,
                    kept = %primary.candidate.id(),
                    duplicate = %scored.candidate.id(),
                    "Merged duplicate candidate"
                );
            }
            None => {
                index.insert(key, kept.len());
                kept.push(scored);
            }
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candidate(id: &str, title: &str, priority: u8) -> RawCandidate {
        RawCandidate::new("test", CanonicalMetadata::new(id, title)).with_priority(priority)
    }

    fn ids(ranked: &[ScoredCandidate]) -> Vec<&str> {
        ranked.iter().map(|s| s.candidate.id()).collect()
    }

    #[test]
    fn test_exact_match_outranks_higher_fuzzy() {
        let ranker = Ranker::new(60, TieBreakOrder::DescriptionFirst);
        let ranked = ranker.rank(
            "Thief",
            vec![candidate("a", "Thief Gold", 1), candidate("b", "thief", 0)],
        );
        assert_eq!(ids(&ranked), vec!["b", "a"]);
        assert!(ranked[0].exact_match);
    }

    #[test]
    fn test_below_minimum_discarded() {
        let ranker = Ranker::new(60, TieBreakOrder::DescriptionFirst);
        let ranked = ranker.rank(
            "Witcher 3",
            vec![
                candidate("1", "The Witcher 3: Wild Hunt", 1),
                candidate("2", "Gwent", 1),
            ],
        );
        assert_eq!(ids(&ranked), vec!["1"]);
    }

    #[test]
    fn test_priority_breaks_full_tie() {
        let ranker = Ranker::new(60, TieBreakOrder::DescriptionFirst);
        let ranked = ranker.rank(
            "Portal",
            vec![candidate("low", "Portal", 0), candidate("high", "Portal", 1)],
        );
        assert_eq!(ids(&ranked), vec!["high", "low"]);
    }

    #[test]
    fn test_description_before_priority_by_default() {
        let mut described = candidate("described", "Portal", 0);
        described.metadata.description = Some("Test chambers.".into());
        let bare = candidate("bare", "Portal", 1);

        let ranked = Ranker::new(60, TieBreakOrder::DescriptionFirst)
            .rank("Portal", vec![bare.clone(), described.clone()]);
        assert_eq!(ids(&ranked), vec!["described", "bare"]);

        let ranked =
            Ranker::new(60, TieBreakOrder::PriorityFirst).rank("Portal", vec![described, bare]);
        assert_eq!(ids(&ranked), vec!["bare", "described"]);
    }

    #[test]
    fn test_complete_tie_is_stable() {
        let ranker = Ranker::new(0, TieBreakOrder::DescriptionFirst);
        let input = vec![
            candidate("first", "Doom", 1),
            candidate("second", "Doom", 1),
            candidate("third", "Doom", 1),
        ];
        for _ in 0..10 {
            let ranked = ranker.rank("Doom", input.clone());
            assert_eq!(ids(&ranked), vec!["first", "second", "third"]);
        }
    }

    #[test]
    fn test_platform_filter() {
        let mut linux = candidate("linux", "Doom", 0);
        linux.metadata.platforms = BTreeSet::from([Platform::Linux]);
        let mut windows = candidate("windows", "Doom", 0);
        windows.metadata.platforms = BTreeSet::from([Platform::Windows, Platform::Mac]);
        let all = vec![linux, windows];

        assert_eq!(filter_platforms(all.clone(), &BTreeSet::new()).len(), 2);
        let kept = filter_platforms(all, &BTreeSet::from([Platform::Mac]));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id(), "windows");
    }

    #[test]
    fn test_dedup_key() {
        let mut record = CanonicalMetadata::new("1", "Fallout 2: A Post-Nuclear RPG");
        assert_eq!(dedup_key(&record), "fallout2apostnuclearrpg_none");
        record.release = Some(Utc.with_ymd_and_hms(1998, 10, 29, 0, 0, 0).unwrap());
        assert_eq!(dedup_key(&record), "fallout2apostnuclearrpg_1998");
    }

    #[test]
    fn test_dedup_key_keeps_non_latin_letters() {
        let koumakyou = CanonicalMetadata::new("1", "東方紅魔郷");
        let youyoumu = CanonicalMetadata::new("2", "東方妖々夢");
        assert_eq!(dedup_key(&koumakyou), "東方紅魔郷_none");
        assert_ne!(dedup_key(&koumakyou), dedup_key(&youyoumu));
        assert_eq!(
            dedup_key(&CanonicalMetadata::new("3", "Ведьмак 3: Дикая Охота")),
            "ведьмак3дикаяохота_none"
        );
    }

    #[test]
    fn test_distinct_non_latin_titles_survive_dedup() {
        let ranker = Ranker::new(0, TieBreakOrder::DescriptionFirst);
        let ranked = ranker.rank(
            "東方",
            vec![candidate("1", "東方紅魔郷", 1), candidate("2", "東方妖々夢", 1)],
        );
        let deduped = deduplicate(ranked);
        let mut kept = ids(&deduped);
        kept.sort_unstable();
        assert_eq!(kept, vec!["1", "2"]);
    }

    #[test]
    fn test_dedup_fills_images_only() {
        let release = Some(Utc.with_ymd_and_hms(1998, 1, 1, 0, 0, 0).unwrap());
        let mut primary = candidate("catalog", "Fallout 2", 1);
        primary.metadata.release = release;
        primary.metadata.header_urls = BTreeSet::from(["https://img/own-header.jpg".into()]);

        let mut duplicate = candidate("gamesdb", "Fallout 2", 0);
        duplicate.metadata.release = release;
        duplicate.metadata.description = Some("Sequel.".into());
        duplicate.metadata.cover_urls = BTreeSet::from(["https://img/cover.jpg".into()]);
        duplicate.metadata.header_urls = BTreeSet::from(["https://img/other-header.jpg".into()]);

        let ranked = Ranker::new(60, TieBreakOrder::PriorityFirst)
            .rank("Fallout 2", vec![duplicate, primary]);
        let deduped = deduplicate(ranked);

        assert_eq!(deduped.len(), 1);
        let kept = &deduped[0].candidate.metadata;
        assert_eq!(kept.id, "catalog");
        assert_eq!(kept.cover_urls, BTreeSet::from(["https://img/cover.jpg".to_string()]));
        assert_eq!(
            kept.header_urls,
            BTreeSet::from(["https://img/own-header.jpg".to_string()])
        );
        assert_eq!(kept.description, None);
    }

    #[test]
    fn test_different_years_are_distinct() {
        let mut original = candidate("1", "Doom", 0);
        original.metadata.release = Some(Utc.with_ymd_and_hms(1993, 1, 1, 0, 0, 0).unwrap());
        let mut reboot = candidate("2", "Doom", 0);
        reboot.metadata.release = Some(Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap());
        let undated = candidate("3", "Doom", 0);

        let ranked = Ranker::new(60, TieBreakOrder::DescriptionFirst)
            .rank("Doom", vec![original, reboot, undated]);
        assert_eq!(deduplicate(ranked).len(), 3);
    }
}

//! Lexical fuzzy similarity on a 0-100 scale
//!
//! [`weighted_ratio`] combines several measures and keeps the best:
//! - whole-string similarity
//! - token-sorted and token-set similarity (word order insensitive)
//! - best-window partial similarity when one string is much longer
//!   (substring tolerant, so "Witcher 3" matches inside
//!   "The Witcher 3: Wild Hunt")
//!
//! The base similarity is `strsim::normalized_levenshtein`.

use std::collections::BTreeSet;

const UNBASE_SCALE: f64 = 0.95;

/// Lowercase, replace non-alphanumerics with spaces, collapse whitespace
pub fn full_process(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whole-string similarity of two already-processed strings
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Best similarity of the shorter string against every equally long window
/// of the longer one
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (short, long) = if a_chars.len() <= b_chars.len() {
        (a_chars, b_chars)
    } else {
        (b_chars, a_chars)
    };

    if short.is_empty() {
        return 0.0;
    }
    if short.len() == long.len() {
        return ratio(a, b);
    }

    let needle: String = short.iter().collect();
    let mut best = 0.0_f64;
    for window in long.windows(short.len()) {
        let candidate: String = window.iter().collect();
        let score = ratio(&needle, &candidate);
        if score > best {
            best = score;
            if best >= 100.0 {
                break;
            }
        }
    }
    best
}

fn sorted_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_sort(a: &str, b: &str, partial: bool) -> f64 {
    let (a, b) = (sorted_tokens(a), sorted_tokens(b));
    if partial {
        partial_ratio(&a, &b)
    } else {
        ratio(&a, &b)
    }
}

fn token_set(a: &str, b: &str, partial: bool) -> f64 {
    let a_tokens: BTreeSet<&str> = a.split_whitespace().collect();
    let b_tokens: BTreeSet<&str> = b.split_whitespace().collect();

    let join = |tokens: Vec<&str>| tokens.join(" ");
    let intersection = join(a_tokens.intersection(&b_tokens).copied().collect());
    let only_a = join(a_tokens.difference(&b_tokens).copied().collect());
    let only_b = join(b_tokens.difference(&a_tokens).copied().collect());

    let combined_a = format!("{} {}", intersection, only_a).trim().to_string();
    let combined_b = format!("{} {}", intersection, only_b).trim().to_string();

    let score = |x: &str, y: &str| {
        if partial {
            partial_ratio(x, y)
        } else {
            ratio(x, y)
        }
    };

    score(&intersection, &combined_a)
        .max(score(&intersection, &combined_b))
        .max(score(&combined_a, &combined_b))
}

/// Order- and substring-tolerant similarity, rounded to 0-100
pub fn weighted_ratio(a: &str, b: &str) -> u8 {
    let p1 = full_process(a);
    let p2 = full_process(b);
    if p1.is_empty() || p2.is_empty() {
        return 0;
    }

    let base = ratio(&p1, &p2);
    let len1 = p1.chars().count() as f64;
    let len2 = p2.chars().count() as f64;
    let len_ratio = len1.max(len2) / len1.min(len2);

    let best = if len_ratio < 1.5 {
        base.max(token_sort(&p1, &p2, false) * UNBASE_SCALE)
            .max(token_set(&p1, &p2, false) * UNBASE_SCALE)
    } else {
        let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
        base.max(partial_ratio(&p1, &p2) * partial_scale)
            .max(token_sort(&p1, &p2, true) * UNBASE_SCALE * partial_scale)
            .max(token_set(&p1, &p2, true) * UNBASE_SCALE * partial_scale)
    };

    best.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_titles_score_100() {
        assert_eq!(weighted_ratio("Fallout 2", "fallout 2"), 100);
        assert_eq!(weighted_ratio("Portal 2", "Portal 2"), 100);
    }

    #[test]
    fn test_substring_tolerant() {
        let score = weighted_ratio("Witcher 3", "The Witcher 3: Wild Hunt");
        assert!(score >= 60, "got {}", score);
        assert!(score < 100);
    }

    #[test]
    fn test_unrelated_title_scores_low() {
        let score = weighted_ratio("Witcher 3", "Gwent");
        assert!(score < 60, "got {}", score);
    }

    #[test]
    fn test_word_order_insensitive() {
        let score = weighted_ratio("Gold Thief", "Thief Gold");
        assert!(score >= 90, "got {}", score);
    }

    #[test]
    fn test_punctuation_ignored() {
        assert_eq!(weighted_ratio("Baldur's Gate", "baldur s gate"), 100);
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        assert_eq!(weighted_ratio("", "Portal"), 0);
        assert_eq!(weighted_ratio("!!!", "Portal"), 0);
    }

    #[test]
    fn test_partial_ratio_finds_best_window() {
        assert_eq!(partial_ratio("witcher 3", "the witcher 3 wild hunt"), 100.0);
        assert_eq!(partial_ratio("", "abc"), 0.0);
    }
}

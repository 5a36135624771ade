//! Partial-ratio fuzzy scoring.
//!
//! The score of two strings is the best normalized Levenshtein similarity
//! between the shorter string and any equally long window of the longer
//! one, scaled to 0–100. A query that is a substring of a name scores 100
//! regardless of how much longer the name is.

use strsim::normalized_levenshtein;

/// A candidate name with its score against the current query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredName {
    pub name: String,
    pub score: u8,
}

/// Lowercase, replace anything that is not a letter or digit with a space,
/// and trim the ends.
pub fn default_process(input: &str) -> String {
    let mapped: String = input
        .chars()
        .flat_map(|c| {
            let lowered: Vec<char> = if c.is_alphanumeric() {
                c.to_lowercase().collect()
            } else {
                vec![' ']
            };
            lowered
        })
        .collect();
    mapped.trim().to_string()
}

fn ratio(a: &str, b: &str) -> u8 {
    (normalized_levenshtein(a, b) * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Best-aligned substring similarity of `a` and `b`, 0–100.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let a = default_process(a);
    let b = default_process(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (shorter, longer) = if a_chars.len() <= b_chars.len() {
        (a, b_chars)
    } else {
        (b, a_chars)
    };

    let window_len = shorter.chars().count();
    if window_len == longer.len() {
        return ratio(&shorter, &longer.iter().collect::<String>());
    }

    let mut best = 0;
    for window in longer.windows(window_len) {
        let candidate: String = window.iter().collect();
        best = best.max(ratio(&shorter, &candidate));
        if best == 100 {
            break;
        }
    }
    best
}

/// Score every candidate against `query` and keep the `limit` best.
///
/// Sorting is stable, so equal scores keep their candidate order.
pub fn extract_top(query: &str, candidates: &[String], limit: usize) -> Vec<ScoredName> {
    let mut scored: Vec<ScoredName> = candidates
        .iter()
        .map(|name| ScoredName {
            score: partial_ratio(query, name),
            name: name.clone(),
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(limit);
    scored
}

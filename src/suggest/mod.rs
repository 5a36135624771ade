//! Fuzzy-match-and-expand suggestion pipeline.
//!
//! request → candidate filter → partial-ratio scoring (cached top-N)
//! → minimum-score cutoff → live record lookup → composition expansion
//! → truncate to limit.
//!
//! Discontinued medicines never appear, neither as direct matches nor as
//! related medicines.

pub mod cache;
pub mod candidates;
pub mod scoring;

use std::collections::BTreeSet;

use rusqlite::Connection;
use thiserror::Error;

use crate::config::{DEFAULT_LIMIT, MIN_MATCH_SCORE, RELATED_LIMIT_CAP};
use crate::db::{self, DatabaseError};
use crate::models::{QueryResult, ScoredMedicine, NO_RESULTS_MESSAGE};

pub use cache::ScoreCache;
pub use candidates::filter_candidates;
pub use scoring::{extract_top, partial_ratio, ScoredName};

#[derive(Error, Debug)]
pub enum SuggestError {
    #[error("Query parameter is required")]
    MissingQuery,

    #[error("Catalog read failed: {0}")]
    Database(#[from] DatabaseError),
}

/// A validated suggestion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestRequest {
    /// Trimmed query as sent by the client (case preserved).
    pub query: String,
    pub limit: usize,
}

impl SuggestRequest {
    pub fn new(query: &str, limit: usize) -> Result<Self, SuggestError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SuggestError::MissingQuery);
        }
        Ok(Self {
            query: query.to_string(),
            limit: if limit == 0 { DEFAULT_LIMIT } else { limit },
        })
    }

    /// Build from raw query-string values. A missing, non-numeric or
    /// non-positive limit falls back to the default instead of failing.
    pub fn from_params(query: Option<&str>, limit: Option<&str>) -> Result<Self, SuggestError> {
        Self::new(query.unwrap_or_default(), parse_limit(limit))
    }

    pub fn normalized_query(&self) -> String {
        self.query.to_lowercase()
    }
}

pub fn parse_limit(raw: Option<&str>) -> usize {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|limit| *limit > 0)
        .and_then(|limit| usize::try_from(limit).ok())
        .unwrap_or(DEFAULT_LIMIT)
}

/// Run the full pipeline for one request.
///
/// Store failures abort the request; an empty result is not an error.
pub fn suggest(
    conn: &Connection,
    cache: &ScoreCache,
    request: &SuggestRequest,
) -> Result<QueryResult, SuggestError> {
    let normalized = request.normalized_query();
    let limit = request.limit;

    let top = cache.get_or_try_compute(&normalized, limit, || {
        let candidates = filter_candidates(conn, &normalized)?;
        tracing::debug!(query = %normalized, candidates = candidates.len(), "Scoring candidates");
        Ok::<_, DatabaseError>(extract_top(&normalized, &candidates, limit))
    })?;

    let mut suggestions: Vec<ScoredMedicine> = Vec::new();
    let mut seen_names: BTreeSet<String> = BTreeSet::new();
    let mut seen_compositions: BTreeSet<String> = BTreeSet::new();

    for scored in top.iter().filter(|s| s.score >= MIN_MATCH_SCORE) {
        if seen_names.contains(&scored.name) {
            continue;
        }
        let Some(record) = db::find_live_by_name(conn, &scored.name)? else {
            continue;
        };
        seen_names.insert(record.name.clone());
        seen_compositions.extend(record.compositions().map(String::from));
        suggestions.push(ScoredMedicine::direct(record, scored.score));
    }

    if !seen_compositions.is_empty() {
        let related_limit = limit.min(RELATED_LIMIT_CAP);
        let related = db::find_related(conn, &seen_compositions, &seen_names, related_limit)?;
        suggestions.extend(related.into_iter().map(ScoredMedicine::related));
    }

    let total = suggestions.len();
    suggestions.truncate(limit);
    let message = suggestions.is_empty().then(|| NO_RESULTS_MESSAGE.to_string());

    tracing::debug!(
        query = %normalized,
        limit,
        direct = seen_names.len(),
        total,
        "Suggestions assembled"
    );

    Ok(QueryResult {
        query: request.query.clone(),
        suggestions,
        total,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{insert_medicine, open_memory_database};
    use crate::models::MedicineRecord;

    fn add(conn: &Connection, id: i64, name: &str, composition: Option<&str>, discontinued: bool) {
        let mut med = MedicineRecord::new(id, name);
        med.composition1 = composition.map(String::from);
        med.is_discontinued = discontinued;
        insert_medicine(conn, &med).unwrap();
    }

    fn run(conn: &Connection, query: &str, limit: usize) -> QueryResult {
        let cache = ScoreCache::new(16);
        suggest(conn, &cache, &SuggestRequest::new(query, limit).unwrap()).unwrap()
    }

    fn score_of(result: &QueryResult, name: &str) -> Option<u8> {
        result
            .suggestions
            .iter()
            .find(|s| s.medicine.name == name)
            .map(|s| s.match_score)
    }

    #[test]
    fn request_rejects_blank_query() {
        assert!(matches!(SuggestRequest::new("   ", 10), Err(SuggestError::MissingQuery)));
        assert!(matches!(
            SuggestRequest::from_params(None, Some("5")),
            Err(SuggestError::MissingQuery)
        ));
    }

    #[test]
    fn request_trims_query_and_keeps_case() {
        let request = SuggestRequest::new("  Dolo 650 ", 3).unwrap();
        assert_eq!(request.query, "Dolo 650");
        assert_eq!(request.normalized_query(), "dolo 650");
        assert_eq!(request.limit, 3);
    }

    #[test]
    fn limit_parse_is_lenient() {
        assert_eq!(parse_limit(None), DEFAULT_LIMIT);
        assert_eq!(parse_limit(Some("abc")), DEFAULT_LIMIT);
        assert_eq!(parse_limit(Some("0")), DEFAULT_LIMIT);
        assert_eq!(parse_limit(Some("-4")), DEFAULT_LIMIT);
        assert_eq!(parse_limit(Some(" 25 ")), 25);
    }

    #[test]
    fn direct_match_plus_related_by_composition() {
        let conn = open_memory_database().unwrap();
        add(&conn, 1, "Paracetamol 500mg", Some("Paracetamol"), false);
        add(&conn, 2, "Paracip 500", Some("Paracetamol"), false);

        let result = run(&conn, "paracetamol", 10);
        assert!(score_of(&result, "Paracetamol 500mg").unwrap() >= 60);
        assert_eq!(score_of(&result, "Paracip 500"), Some(0));
        let paracip = result
            .suggestions
            .iter()
            .filter(|s| s.medicine.name == "Paracip 500")
            .count();
        assert_eq!(paracip, 1);
        assert_eq!(result.total, 2);
        assert!(result.message.is_none());
    }

    #[test]
    fn nothing_above_threshold_yields_message() {
        let conn = open_memory_database().unwrap();
        add(&conn, 1, "Azithral 500", Some("Azithromycin"), false);

        let result = run(&conn, "azxqwv", 10);
        assert!(result.suggestions.is_empty());
        assert_eq!(result.total, 0);
        assert_eq!(result.message.as_deref(), Some(NO_RESULTS_MESSAGE));
    }

    #[test]
    fn discontinued_top_match_is_replaced_by_live_one() {
        let conn = open_memory_database().unwrap();
        add(&conn, 1, "Paracetamol", Some("Paracetamol"), true);
        add(&conn, 2, "Paracetomol Plus", Some("Paracetamol + Caffeine"), false);

        let result = run(&conn, "paracetamol", 10);
        assert!(score_of(&result, "Paracetamol").is_none());
        let live = score_of(&result, "Paracetomol Plus").unwrap();
        assert!((60..100).contains(&live), "got {live}");
        assert!(result.suggestions.iter().all(|s| !s.medicine.is_discontinued));
    }

    #[test]
    fn discontinued_related_items_excluded() {
        let conn = open_memory_database().unwrap();
        add(&conn, 1, "Pantocid 40", Some("Pantoprazole"), false);
        add(&conn, 2, "Pan 40", Some("Pantoprazole"), true);
        add(&conn, 3, "Nexpro 40", Some("Pantoprazole"), false);

        let result = run(&conn, "pantocid", 10);
        assert!(score_of(&result, "Pan 40").is_none());
        assert_eq!(score_of(&result, "Nexpro 40"), Some(0));
    }

    #[test]
    fn short_query_scans_whole_catalog() {
        let conn = open_memory_database().unwrap();
        add(&conn, 1, "Paracetamol 500mg", None, false);
        add(&conn, 2, "Brufen 400", None, false);

        // "ol" is no prefix of either name but is a substring of the first
        let result = run(&conn, "ol", 10);
        assert_eq!(score_of(&result, "Paracetamol 500mg"), Some(100));
    }

    #[test]
    fn results_never_exceed_limit_and_total_counts_all() {
        let conn = open_memory_database().unwrap();
        add(&conn, 1, "Dolo 650", Some("Paracetamol"), false);
        add(&conn, 2, "Dolo 500", Some("Paracetamol"), false);
        for id in 3..12 {
            add(&conn, id, &format!("Calpol {id}"), Some("Paracetamol"), false);
        }

        let result = run(&conn, "dolo", 3);
        assert_eq!(result.suggestions.len(), 3);
        // two direct matches + min(limit, 5) = 3 related
        assert_eq!(result.total, 5);
    }

    #[test]
    fn related_capped_at_five() {
        let conn = open_memory_database().unwrap();
        add(&conn, 1, "Dolo 650", Some("Paracetamol"), false);
        for id in 2..20 {
            add(&conn, id, &format!("Calpol {id}"), Some("Paracetamol"), false);
        }

        let result = run(&conn, "dolo", 50);
        let related = result.suggestions.iter().filter(|s| s.is_related()).count();
        assert_eq!(related, 5);
    }

    #[test]
    fn scores_are_zero_or_at_least_threshold() {
        let conn = open_memory_database().unwrap();
        add(&conn, 1, "Augmentin 625 Duo", Some("Amoxycillin + Clavulanic Acid"), false);
        add(&conn, 2, "Augpen 625", Some("Amoxycillin + Clavulanic Acid"), false);
        add(&conn, 3, "Auglin 1g", Some("Augmentin Lookalike"), false);
        add(&conn, 4, "Moxikind CV 625", Some("Amoxycillin + Clavulanic Acid"), false);

        let result = run(&conn, "augmentin", 10);
        assert!(!result.suggestions.is_empty());
        for s in &result.suggestions {
            assert!(s.match_score == 0 || s.match_score >= MIN_MATCH_SCORE);
            if s.match_score > 0 {
                assert!(!s.medicine.is_discontinued);
            }
        }
    }

    #[test]
    fn repeated_query_is_identical_and_cached() {
        let conn = open_memory_database().unwrap();
        add(&conn, 1, "Crocin Advance", Some("Paracetamol"), false);
        add(&conn, 2, "Calpol 500", Some("Paracetamol"), false);

        let cache = ScoreCache::new(16);
        let request = SuggestRequest::new("Crocin", 10).unwrap();
        let first = suggest(&conn, &cache, &request).unwrap();
        let second = suggest(&conn, &cache, &request).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.query, "Crocin");
        assert_eq!(cache.len(), 1);
        assert!(cache.get("crocin", 10).is_some());
    }

    #[test]
    fn store_failure_is_an_error_not_an_empty_result() {
        let conn = open_memory_database().unwrap();
        add(&conn, 1, "Dolo 650", Some("Paracetamol"), false);
        conn.execute_batch("DROP TABLE medicines").unwrap();

        let cache = ScoreCache::new(16);
        let request = SuggestRequest::new("dolo", 10).unwrap();
        let result = suggest(&conn, &cache, &request);
        assert!(matches!(result, Err(SuggestError::Database(_))), "got {result:?}");
        assert!(cache.get("dolo", 10).is_none());
    }

    #[test]
    fn store_failure_after_cached_scoring_is_an_error() {
        let conn = open_memory_database().unwrap();
        add(&conn, 1, "Dolo 650", Some("Paracetamol"), false);
        let cache = ScoreCache::new(16);
        let request = SuggestRequest::new("dolo", 10).unwrap();
        suggest(&conn, &cache, &request).unwrap();

        conn.execute_batch("DROP TABLE medicines").unwrap();
        let result = suggest(&conn, &cache, &request);
        assert!(matches!(result, Err(SuggestError::Database(_))), "got {result:?}");
    }

    #[test]
    fn duplicate_catalog_names_suggested_once() {
        let conn = open_memory_database().unwrap();
        add(&conn, 1, "Zerodol SP", Some("Aceclofenac"), false);
        add(&conn, 2, "Zerodol SP", Some("Aceclofenac"), false);

        let result = run(&conn, "zerodol", 10);
        let direct = result.suggestions.iter().filter(|s| !s.is_related()).count();
        assert_eq!(direct, 1);
        assert_eq!(result.total, 1);
    }
}

//! Candidate narrowing ahead of fuzzy scoring.

use rusqlite::Connection;

use crate::config::PREFIX_FILTER_LEN;
use crate::db::{self, DatabaseError};

/// Names worth scoring for an already-lowercased query.
///
/// Queries of at least three characters only consider names starting with
/// the same three characters; shorter queries scan the whole catalog.
pub fn filter_candidates(conn: &Connection, query: &str) -> Result<Vec<String>, DatabaseError> {
    if query.chars().count() >= PREFIX_FILTER_LEN {
        let prefix: String = query.chars().take(PREFIX_FILTER_LEN).collect();
        db::candidate_names(conn, Some(&prefix))
    } else {
        db::candidate_names(conn, None)
    }
}

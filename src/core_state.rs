//! Process-wide catalog state shared by every request.
//!
//! The catalog is checked once at startup. A failed check does not stop
//! the process: the failure is recorded and every later request gets
//! `CoreError::CatalogUnavailable` instead of a crash. The score cache is
//! the only mutable piece and is safe to share across threads.

use std::path::{Path, PathBuf};

use crate::config::ServerConfig;
use crate::db;
use crate::suggest::ScoreCache;

// ═══════════════════════════════════════════════════════════
// Catalog status
// ═══════════════════════════════════════════════════════════

/// Outcome of the startup catalog check. Fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogStatus {
    Ready { medicines: u64 },
    Unavailable(String),
}

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

/// Shared application state, wrapped in `Arc` at startup.
///
/// Each request opens its own read-only connection via `open_db`, so
/// requests never contend on a shared connection.
pub struct CoreState {
    db_path: PathBuf,
    status: CatalogStatus,
    score_cache: ScoreCache,
}

impl CoreState {
    /// Check the catalog once and build the shared state.
    pub fn initialize(config: &ServerConfig) -> Self {
        let status = match load_catalog(&config.db_path) {
            Ok(medicines) => {
                tracing::info!(
                    path = %config.db_path.display(),
                    medicines,
                    "Medicine catalog loaded"
                );
                CatalogStatus::Ready { medicines }
            }
            Err(e) => {
                tracing::error!(
                    path = %config.db_path.display(),
                    error = %e,
                    "Medicine catalog failed to load, suggestions will be unavailable"
                );
                CatalogStatus::Unavailable(e.to_string())
            }
        };
        Self::with_status(config.db_path.clone(), status, ScoreCache::new(config.cache_capacity))
    }

    pub fn with_status(db_path: PathBuf, status: CatalogStatus, score_cache: ScoreCache) -> Self {
        Self {
            db_path,
            status,
            score_cache,
        }
    }

    /// Open a read-only catalog connection for one request.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        match &self.status {
            CatalogStatus::Ready { .. } => {
                db::open_database(&self.db_path).map_err(CoreError::Database)
            }
            CatalogStatus::Unavailable(reason) => {
                Err(CoreError::CatalogUnavailable(reason.clone()))
            }
        }
    }

    pub fn status(&self) -> &CatalogStatus {
        &self.status
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.status, CatalogStatus::Ready { .. })
    }

    /// Row count observed at startup (0 when unavailable).
    pub fn medicine_count(&self) -> u64 {
        match self.status {
            CatalogStatus::Ready { medicines } => medicines,
            CatalogStatus::Unavailable(_) => 0,
        }
    }

    pub fn score_cache(&self) -> &ScoreCache {
        &self.score_cache
    }
}

fn load_catalog(path: &Path) -> Result<u64, db::DatabaseError> {
    let conn = db::open_database(path)?;
    db::count_medicines(&conn)
}

// ═══════════════════════════════════════════════════════════
// Error types
// ═══════════════════════════════════════════════════════════

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Medicine catalog unavailable: {0}")]
    CatalogUnavailable(String),
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MedicineRecord;

    fn config_for(path: PathBuf) -> ServerConfig {
        ServerConfig::new(path, "127.0.0.1:0".parse().unwrap()).with_cache_capacity(8)
    }

    fn seeded_catalog(dir: &Path) -> PathBuf {
        let path = dir.join("medicines.db");
        let conn = db::create_database(&path).unwrap();
        db::insert_medicine(&conn, &MedicineRecord::new(1, "Dolo 650")).unwrap();
        db::insert_medicine(&conn, &MedicineRecord::new(2, "Calpol 500")).unwrap();
        path
    }

    #[test]
    fn initialize_counts_loaded_catalog() {
        let tmp = tempfile::tempdir().unwrap();
        let state = CoreState::initialize(&config_for(seeded_catalog(tmp.path())));
        assert!(state.is_loaded());
        assert_eq!(state.status(), &CatalogStatus::Ready { medicines: 2 });
        assert_eq!(state.medicine_count(), 2);
        assert_eq!(state.score_cache().capacity(), 8);
        assert!(state.open_db().is_ok());
    }

    #[test]
    fn missing_catalog_degrades_instead_of_panicking() {
        let tmp = tempfile::tempdir().unwrap();
        let state = CoreState::initialize(&config_for(tmp.path().join("absent.db")));
        assert!(!state.is_loaded());
        assert_eq!(state.medicine_count(), 0);
        match state.open_db() {
            Err(CoreError::CatalogUnavailable(_)) => {}
            other => panic!("Expected CatalogUnavailable, got: {other:?}"),
        }
    }

    #[test]
    fn malformed_catalog_is_unavailable() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("medicines.db");
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE medicines (id INTEGER PRIMARY KEY, title TEXT)")
            .unwrap();
        drop(conn);

        let state = CoreState::initialize(&config_for(path));
        match state.status() {
            CatalogStatus::Unavailable(reason) => assert!(reason.contains("name")),
            other => panic!("Expected Unavailable, got: {other:?}"),
        }
    }
}

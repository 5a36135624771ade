use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "MedSuggest";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Suggestions returned when the client sends no usable `limit`.
pub const DEFAULT_LIMIT: usize = 10;

/// Direct fuzzy matches scoring below this are discarded.
pub const MIN_MATCH_SCORE: u8 = 60;

/// Upper bound on related (same-composition) medicines per request.
pub const RELATED_LIMIT_CAP: usize = 5;

/// Queries at least this long are narrowed to names sharing their prefix.
pub const PREFIX_FILTER_LEN: usize = 3;

/// Distinct `(query, limit)` pairs kept in the score cache.
pub const SCORE_CACHE_CAPACITY: u64 = 1000;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

pub const DATABASE_FILE_NAME: &str = "medicines.db";

/// Catalog table produced by the import step.
pub const TABLE_NAME: &str = "medicines";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "medsuggest=info,medsuggest_lib=info,tower_http=info"
}

/// Get the application data directory.
/// Falls back to the working directory on platforms without a data dir.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("medsuggest"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Default location of the catalog database.
pub fn default_database_path() -> PathBuf {
    app_data_dir().join(DATABASE_FILE_NAME)
}

/// Runtime settings for the HTTP service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub cache_capacity: u64,
}

impl ServerConfig {
    pub fn new(db_path: PathBuf, bind_addr: SocketAddr) -> Self {
        Self {
            db_path,
            bind_addr,
            cache_capacity: SCORE_CACHE_CAPACITY,
        }
    }

    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }
}

//! Bounded, thread-safe cache of scored candidate lists.
//!
//! Keyed by `(normalized query, limit)`. Entries beyond the capacity are
//! evicted least-recently-used first. Failed computations are never stored.

use std::sync::Arc;

use moka::policy::EvictionPolicy;
use moka::sync::Cache;

use super::scoring::ScoredName;
use crate::config::SCORE_CACHE_CAPACITY;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ScoreKey {
    query: String,
    limit: usize,
}

impl ScoreKey {
    fn new(query: &str, limit: usize) -> Self {
        Self {
            query: query.to_string(),
            limit,
        }
    }
}

/// Shared top-N score cache. Cloning shares the underlying storage.
#[derive(Clone)]
pub struct ScoreCache {
    inner: Cache<ScoreKey, Arc<Vec<ScoredName>>>,
    capacity: u64,
}

impl ScoreCache {
    pub fn new(capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self { inner, capacity }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn get(&self, query: &str, limit: usize) -> Option<Arc<Vec<ScoredName>>> {
        self.inner.get(&ScoreKey::new(query, limit))
    }

    pub fn insert(&self, query: &str, limit: usize, scored: Vec<ScoredName>) -> Arc<Vec<ScoredName>> {
        let scored = Arc::new(scored);
        self.inner.insert(ScoreKey::new(query, limit), scored.clone());
        scored
    }

    /// Return the cached list or compute, store and return it.
    pub fn get_or_try_compute<E, F>(
        &self,
        query: &str,
        limit: usize,
        compute: F,
    ) -> Result<Arc<Vec<ScoredName>>, E>
    where
        F: FnOnce() -> Result<Vec<ScoredName>, E>,
    {
        if let Some(hit) = self.get(query, limit) {
            tracing::trace!(query, limit, "Score cache hit");
            return Ok(hit);
        }
        let scored = compute()?;
        Ok(self.insert(query, limit, scored))
    }

    /// Number of live entries once pending evictions have been applied.
    pub fn len(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks();
    }
}

impl Default for ScoreCache {
    fn default() -> Self {
        Self::new(SCORE_CACHE_CAPACITY)
    }
}

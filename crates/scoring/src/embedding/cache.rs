use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use serde::Serialize;

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub hit_rate: f64,
}

struct Inner {
    cache: LruCache<String, Vec<f32>>,
    hits: u64,
    misses: u64,
}

/// LRU cache of query embeddings keyed by the exact query string.
///
/// Owned by one service instance and safe to share between threads.
pub struct QueryEmbeddingCache {
    inner: Mutex<Inner>,
}

impl QueryEmbeddingCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(Inner {
                cache: LruCache::new(capacity),
                hits: 0,
                misses: 0,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Poisoning leaves cached vectors intact.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up a cached embedding by query text.
    pub fn get(&self, query: &str) -> Option<Vec<f32>> {
        let mut inner = self.lock();
        match inner.cache.get(query).cloned() {
            Some(v) => {
                inner.hits += 1;
                Some(v)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    pub fn put(&self, query: &str, embedding: Vec<f32>) {
        self.lock().cache.put(query.to_string(), embedding);
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.cache.clear();
        inner.hits = 0;
        inner.misses = 0;
    }

    pub fn len(&self) -> usize {
        self.lock().cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        let total = inner.hits + inner.misses;
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            entries: inner.cache.len(),
            hit_rate: if total == 0 {
                0.0
            } else {
                inner.hits as f64 / total as f64
            },
        }
    }
}

impl std::fmt::Debug for QueryEmbeddingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEmbeddingCache")
            .field("stats", &self.stats())
            .finish()
    }
}

//! In-memory per-category quote cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::data_source::Category;
use crate::RawQuote;

/// Default freshness window for a cached category.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// What the resolver does when every provider fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleFallback {
    /// Fail the category and let the degradation policy substitute synthetic data. (Default)
    #[default]
    Fail,
    /// Serve the last cached entry regardless of age.
    ReuseStale,
}

/// One cached category result.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub quote: RawQuote,
    pub fetched_at: Instant,
}

impl CacheEntry {
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<Category, CacheEntry>,
    ttl: Duration,
}

/// Thread-safe category cache.
///
/// Entries are replaced wholesale on every successful fetch and never
/// mutated in place. Staleness is advisory: [`QuoteCache::entry`] returns
/// entries of any age, [`QuoteCache::fresh`] only those younger than the TTL.
#[derive(Debug, Clone)]
pub struct QuoteCache {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl QuoteCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner {
                map: HashMap::new(),
                ttl,
            })),
        }
    }

    /// Create a cache with the 60 second TTL.
    pub fn with_default_ttl() -> Self {
        Self::new(DEFAULT_TTL)
    }

    pub async fn ttl(&self) -> Duration {
        self.inner.read().await.ttl
    }

    /// Returns the entry for `category` regardless of age.
    pub async fn entry(&self, category: Category) -> Option<CacheEntry> {
        self.inner.read().await.map.get(&category).cloned()
    }

    /// Returns the entry for `category` only while it is fresh.
    pub async fn fresh(&self, category: Category) -> Option<CacheEntry> {
        let store = self.inner.read().await;
        store
            .map
            .get(&category)
            .filter(|entry| entry.is_fresh(store.ttl))
            .cloned()
    }

    /// Stores `quote` under its own category with a fresh timestamp.
    pub async fn put(&self, quote: RawQuote) {
        let category = quote.category();
        let entry = CacheEntry {
            quote,
            fetched_at: Instant::now(),
        };
        self.inner.write().await.map.insert(category, entry);
    }

    /// Drops every entry.
    pub async fn clear(&self) {
        self.inner.write().await.map.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.map.is_empty()
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::with_default_ttl()
    }
}

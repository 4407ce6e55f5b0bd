//! TTL-bounded cache storage.
//!
//! Entries are snapshots stamped with their insertion time. Nothing here is
//! invalidated by writes to the underlying stores: an entry stays visible
//! until its TTL runs out or LRU capacity pushes it out.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use lru::LruCache;
use metrics::counter;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::entities::{AuthorRecord, PostRecord};

use super::config::CacheConfig;
use super::keys::CacheKey;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

struct Entry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Duration,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= self.ttl
    }
}

/// A keyed TTL store with LRU capacity.
pub struct TtlStore<V> {
    name: &'static str,
    entries: RwLock<LruCache<CacheKey, Entry<V>>>,
}

impl<V: Clone> TtlStore<V> {
    pub fn new(name: &'static str, config: &CacheConfig) -> Self {
        Self {
            name,
            entries: RwLock::new(LruCache::new(config.capacity_non_zero())),
        }
    }

    /// Fresh value for `key`. Expired entries are dropped and reported as absent.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        let now = Instant::now();

        let expired = match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                counter!("postline_cache_hit_total", "store" => self.name).increment(1);
                debug!(target = "postline::cache", store = self.name, %key, "cache hit");
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
            counter!("postline_cache_expired_total", "store" => self.name).increment(1);
        }
        counter!("postline_cache_miss_total", "store" => self.name).increment(1);
        debug!(target = "postline::cache", store = self.name, %key, expired, "cache miss");
        None
    }

    /// Store `value` under `key` for `ttl`, replacing any previous entry.
    pub fn set(&self, key: CacheKey, value: V, ttl: Duration) {
        let entry = Entry {
            value,
            inserted_at: Instant::now(),
            ttl,
        };
        let evicted = rw_write(&self.entries, SOURCE, "set").push(key.clone(), entry);
        if let Some((evicted_key, _)) = evicted
            && evicted_key != key
        {
            counter!("postline_cache_evict_total", "store" => self.name).increment(1);
            debug!(
                target = "postline::cache",
                store = self.name,
                key = %evicted_key,
                "cache entry evicted"
            );
        }
    }

    /// Number of entries held, fresh or not.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Snapshot cache in front of the post listing and the author aggregate.
pub struct ListingCache {
    posts: TtlStore<Arc<[PostRecord]>>,
    authors: TtlStore<Arc<[AuthorRecord]>>,
    ttl: Duration,
}

impl ListingCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            posts: TtlStore::new("posts", config),
            authors: TtlStore::new("authors", config),
            ttl: config.ttl,
        }
    }

    pub fn get_posts(&self, key: &CacheKey) -> Option<Arc<[PostRecord]>> {
        self.posts.get(key)
    }

    pub fn set_posts(&self, key: CacheKey, posts: Arc<[PostRecord]>) {
        self.posts.set(key, posts, self.ttl);
    }

    pub fn get_authors(&self) -> Option<Arc<[AuthorRecord]>> {
        self.authors.get(&CacheKey::Authors)
    }

    pub fn set_authors(&self, authors: Arc<[AuthorRecord]>) {
        self.authors.set(CacheKey::Authors, authors, self.ttl);
    }
}

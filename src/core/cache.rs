use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

struct Entry<T> {
    value: T,
    stored_at: Instant,
}

/// TTL-bounded LRU of search responses.
///
/// Keys carry the catalog generation, so a catalog swap makes every older
/// entry unreachable and LRU pressure evicts it.
pub struct ResponseCache<T> {
    entries: Mutex<LruCache<String, Entry<T>>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }
}

impl<T: Clone> ResponseCache<T> {
    pub fn new(capacity: usize, ttl_secs: u64) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: Duration::from_secs(ttl_secs),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// SHA-256 over the catalog generation and the raw query.
    pub fn make_key(generation: u64, query: &str) -> String {
        let digest = Sha256::new()
            .chain_update(generation.to_be_bytes())
            .chain_update(query.as_bytes())
            .finalize();
        format!("{digest:x}")
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock();
        let expired = match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub fn set(&self, key: &str, value: T) {
        let entry = Entry {
            value,
            stored_at: Instant::now(),
        };
        self.entries.lock().put(key.to_string(), entry);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.entries.lock().len(),
        }
    }
}

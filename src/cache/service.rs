//! Response cache service with lazy TTL expiry

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};
use super::entry::CacheEntry;
use crate::config::CacheConfig;

/// Counters describing cache effectiveness since construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Stale entries reclaimed on read
    pub expired: u64,
    /// Entries currently stored, including stale ones not yet reclaimed
    pub entries: usize,
}

/// Key/value store for API responses with per-entry TTL
///
/// Reads never fail: a missing or expired entry is a miss and the caller
/// falls through to a real fetch. The default value type is a JSON body.
pub struct ResponseCache<V = Value> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
}

impl<V: Clone> ResponseCache<V> {
    /// Create a cache reading time from the system clock
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_clock(default_ttl, Arc::new(SystemClock))
    }

    /// Create a cache with an explicit time source
    pub fn with_clock(default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expired: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.default_ttl)
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Return the stored value if present and not expired
    ///
    /// An expired entry is removed so it cannot be read again.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        {
            let entries = self.read_entries();
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    trace!(
                        "Cache hit: {} (age {:?}, {:?} left)",
                        key,
                        entry.age(now),
                        entry.remaining(now)
                    );
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    trace!("Cache miss: {}", key);
                    return None;
                }
            }
        }

        // Re-check under the write lock; a concurrent set may have refreshed it
        let mut entries = self.write_entries();
        if let Some(entry) = entries.get(key) {
            if entry.is_live(now) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
            let age = entry.age(now);
            entries.remove(key);
            self.expired.fetch_add(1, Ordering::Relaxed);
            debug!("Cache entry expired: {} (stored {:?} ago)", key, age);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store `value` under `key` with the default TTL, replacing any entry
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Store `value` under `key` with an explicit TTL, replacing any entry
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let entry = CacheEntry::new(value, self.clock.now(), ttl);
        trace!("Cache set: {} (ttl {:?})", key, ttl);
        self.write_entries().insert(key, entry);
    }

    /// Drop a single entry; returns whether one was stored
    pub fn remove(&self, key: &str) -> bool {
        self.write_entries().remove(key).is_some()
    }

    /// Drop every entry
    pub fn clear(&self) {
        let mut entries = self.write_entries();
        let count = entries.len();
        entries.clear();
        debug!("Cache cleared ({} entries dropped)", count);
    }

    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    /// Return a live cached value, or await `fetch` and cache its success
    ///
    /// Fetch errors are returned unchanged and nothing is stored.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = fetch().await?;
        self.set(key, value.clone());
        Ok(value)
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl ResponseCache<Value> {
    /// Typed read of a JSON entry; a body of the wrong shape counts as a miss
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                debug!("Cached value for {} has unexpected shape: {}", key, e);
                None
            }
        }
    }

    /// Serialize `value` to JSON and store it with the default TTL
    pub fn set_as<T: Serialize>(
        &self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<(), serde_json::Error> {
        let json = serde_json::to_value(value)?;
        self.set(key, json);
        Ok(())
    }
}

impl<V> std::fmt::Debug for ResponseCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("default_ttl", &self.default_ttl)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

//! TTL/LRU result store
//!
//! A capacity-bounded, TTL-bounded key-value store memoizing scan
//! results. All mutations happen behind one mutex and stay short: no
//! filesystem work is ever done while the lock is held. Expiry is lazy
//! (checked on `get`), with an optional `cleanup_expired` sweep for
//! proactive reclamation. Eviction is least-recently-used, ranked by
//! last successful read: merely rewriting a key does not refresh its
//! recency.

use crate::error::{DirmapError, Result};
use serde::Serialize;
use std::collections::{hash_map, HashMap};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

/// A cached value with its bookkeeping
struct CacheEntry<V> {
    value: V,
    created_at: Instant,
    expires_at: Instant,
    last_accessed: Instant,
    access_count: u64,
    /// LRU rank; bumped on hits only
    recency: u64,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Point-in-time cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Entries currently stored
    pub entries: usize,
    /// Maximum entries
    pub capacity: usize,
    /// Successful reads
    pub hits: u64,
    /// Reads that found nothing usable
    pub misses: u64,
    /// Entries removed by capacity pressure
    pub evictions: u64,
    /// Entries found expired on access or sweep
    pub expired: u64,
}

impl CacheStats {
    /// Fraction of reads that hit, 0.0 when no reads happened yet
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Introspection report for one cache entry
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntryInfo {
    /// The entry's key
    pub key: String,
    /// Time since creation
    pub age: Duration,
    /// Time since the last successful read (creation if never read)
    pub idle: Duration,
    /// Time until expiry (zero if already expired)
    pub ttl_remaining: Duration,
    /// Successful reads of this entry
    pub access_count: u64,
    /// Whether the entry would miss on the next read
    pub is_expired: bool,
}

struct Inner<V> {
    map: HashMap<String, CacheEntry<V>>,
    hits: u64,
    misses: u64,
    evictions: u64,
    expired: u64,
    /// Monotonic recency clock
    clock: u64,
}

/// Capacity- and TTL-bounded store memoizing scan results
///
/// Generic over the cached value; scan results are cheap handles
/// (`Arc`-wrapped trees), so `get` clones are trivial.
pub struct ResultCache<V> {
    inner: Mutex<Inner<V>>,
    capacity: usize,
    default_ttl: Duration,
}

impl<V: Clone> ResultCache<V> {
    /// Create a cache holding at most `capacity` entries
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                map: HashMap::new(),
                hits: 0,
                misses: 0,
                evictions: 0,
                expired: 0,
                clock: 0,
            }),
            capacity: capacity.max(1),
            default_ttl,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner<V>>> {
        // A poisoned lock means a scan thread died mid-mutation; callers
        // degrade to uncached operation rather than failing the request.
        self.inner.lock().map_err(|_| DirmapError::CacheUnavailable)
    }

    /// Read a value, updating recency and statistics
    ///
    /// An entry past its TTL is purged here and reported as a miss.
    pub fn get(&self, key: &str) -> Result<Option<V>> {
        let mut inner = self.lock()?;
        let now = Instant::now();

        let Inner {
            map,
            hits,
            misses,
            expired,
            clock,
            ..
        } = &mut *inner;

        match map.entry(key.to_string()) {
            hash_map::Entry::Vacant(_) => {
                *misses += 1;
                Ok(None)
            }
            hash_map::Entry::Occupied(occupied) if occupied.get().is_expired(now) => {
                occupied.remove();
                *expired += 1;
                *misses += 1;
                Ok(None)
            }
            hash_map::Entry::Occupied(mut occupied) => {
                *hits += 1;
                *clock += 1;
                let entry = occupied.get_mut();
                entry.access_count += 1;
                entry.last_accessed = now;
                entry.recency = *clock;
                Ok(Some(entry.value.clone()))
            }
        }
    }

    /// Store a value under `key`
    ///
    /// `ttl` of `None` applies the cache's default. Rewriting an existing
    /// key refreshes its value and TTL but keeps its recency rank. When a
    /// new key would exceed capacity, the least-recently-read entry is
    /// evicted first.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) -> Result<()> {
        let key = key.into();
        let ttl = ttl.unwrap_or(self.default_ttl);
        let mut inner = self.lock()?;
        let now = Instant::now();

        let recency = if let Some(existing) = inner.map.get(&key) {
            existing.recency
        } else {
            while inner.map.len() >= self.capacity {
                let Some(lru) = inner
                    .map
                    .iter()
                    .min_by_key(|(_, e)| e.recency)
                    .map(|(k, _)| k.clone())
                else {
                    break;
                };
                inner.map.remove(&lru);
                inner.evictions += 1;
                debug!(key = %lru, "evicted least-recently-used cache entry");
            }
            inner.clock += 1;
            inner.clock
        };

        inner.map.insert(
            key,
            CacheEntry {
                value,
                created_at: now,
                expires_at: now + ttl,
                last_accessed: now,
                access_count: 0,
                recency,
            },
        );
        Ok(())
    }

    /// Remove a key, reporting whether it existed
    pub fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.lock()?.map.remove(key).is_some())
    }

    /// Drop all entries and reset statistics
    pub fn clear(&self) -> Result<()> {
        let mut inner = self.lock()?;
        inner.map.clear();
        inner.hits = 0;
        inner.misses = 0;
        inner.evictions = 0;
        inner.expired = 0;
        Ok(())
    }

    /// Remove every expired entry, returning how many were dropped
    pub fn cleanup_expired(&self) -> Result<usize> {
        let mut inner = self.lock()?;
        let now = Instant::now();
        let before = inner.map.len();
        inner.map.retain(|_, entry| !entry.is_expired(now));
        let removed = before - inner.map.len();
        inner.expired += removed as u64;
        if removed > 0 {
            debug!(removed, "cleaned up expired cache entries");
        }
        Ok(removed)
    }

    /// Current statistics snapshot
    pub fn stats(&self) -> Result<CacheStats> {
        let inner = self.lock()?;
        Ok(CacheStats {
            entries: inner.map.len(),
            capacity: self.capacity,
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            expired: inner.expired,
        })
    }

    /// Introspect one entry without touching its recency
    pub fn entry_info(&self, key: &str) -> Result<Option<CacheEntryInfo>> {
        let inner = self.lock()?;
        let now = Instant::now();
        Ok(inner.map.get(key).map(|entry| CacheEntryInfo {
            key: key.to_string(),
            age: now.duration_since(entry.created_at),
            idle: now.duration_since(entry.last_accessed),
            ttl_remaining: entry.expires_at.saturating_duration_since(now),
            access_count: entry.access_count,
            is_expired: entry.is_expired(now),
        }))
    }

    /// Push an unexpired entry's expiry further out
    pub fn extend_ttl(&self, key: &str, extra: Duration) -> Result<bool> {
        let mut inner = self.lock()?;
        let now = Instant::now();
        match inner.map.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => {
                entry.expires_at += extra;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Number of stored entries (expired-but-unswept included)
    pub fn len(&self) -> usize {
        self.lock().map(|inner| inner.map.len()).unwrap_or(0)
    }

    /// True when nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

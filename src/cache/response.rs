//! TTL response cache for GET requests.
//!
//! [`ResponseCache`] stores successful envelopes keyed on
//! [`RequestKey`]. Expiry is checked lazily on read: an entry older than
//! the TTL is evicted by the lookup that finds it.
//!
//! # Eviction
//!
//! The cache holds at most `max_entries` entries. Inserting a new key
//! into a full cache evicts the oldest-inserted entry. Overwriting an
//! existing key refreshes its timestamp but keeps its place in the
//! insertion order and never evicts anything.
//!
//! # Invalidation epoch
//!
//! Every `remove`, `invalidate_resource` and `clear` advances the cache
//! epoch. A dispatch records the epoch when it starts and stores its
//! response with [`ResponseCache::insert_if_current`], which refuses the
//! write once the epoch has moved: a read that raced a mutation never
//! lands in the cache.
//!
//! Time is read from `tokio::time::Instant`, so tests running with paused
//! time can step past the TTL with `tokio::time::advance`.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

use crate::telemetry;
use crate::types::{ApiResponse, RequestKey};

/// Configuration for the response cache.
///
/// ```rust
/// # use godpanel::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(50)
///     .ttl(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of cached entries. 0 disables caching. Default: 100.
    pub max_entries: usize,
    /// Time-to-live for cached entries. Default: 5 minutes.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            ttl: Duration::from_secs(300),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// A config that never stores anything.
    pub fn disabled() -> Self {
        Self {
            max_entries: 0,
            ..Self::default()
        }
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live for cached entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

#[derive(Debug, Clone)]
struct Entry {
    response: ApiResponse<Value>,
    created_at: Instant,
}

#[derive(Debug, Default)]
struct Slots {
    entries: HashMap<RequestKey, Entry>,
    /// Keys in insertion order, oldest first.
    order: VecDeque<RequestKey>,
    epoch: u64,
}

impl Slots {
    fn remove(&mut self, key: &RequestKey) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.retain(|k| k != key);
            true
        } else {
            false
        }
    }
}

/// In-memory response cache. See module docs.
#[derive(Debug)]
pub struct ResponseCache {
    config: CacheConfig,
    slots: Mutex<Slots>,
}

impl ResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            slots: Mutex::new(Slots::default()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a fresh entry. Expired entries are evicted and count as misses.
    pub fn get(&self, key: &RequestKey) -> Option<ApiResponse<Value>> {
        let mut slots = self.slots();
        let fresh = match slots.entries.get(key) {
            Some(entry) if entry.created_at.elapsed() <= self.config.ttl => {
                Some(entry.response.clone())
            }
            Some(_) => {
                slots.remove(key);
                None
            }
            None => None,
        };
        drop(slots);

        let url = key.url().to_owned();
        if fresh.is_some() {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "url" => url).increment(1);
        } else {
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "url" => url).increment(1);
        }
        fresh
    }

    /// Current invalidation epoch. See module docs.
    pub fn epoch(&self) -> u64 {
        self.slots().epoch
    }

    /// Store a response with the configured TTL.
    pub fn insert(&self, key: RequestKey, response: ApiResponse<Value>) {
        let mut slots = self.slots();
        self.store(&mut slots, key, response);
    }

    /// Store a response unless the cache was invalidated since `epoch`.
    /// Returns whether the response was stored.
    pub fn insert_if_current(
        &self,
        key: RequestKey,
        response: ApiResponse<Value>,
        epoch: u64,
    ) -> bool {
        let mut slots = self.slots();
        if slots.epoch != epoch {
            return false;
        }
        self.store(&mut slots, key, response);
        self.config.max_entries > 0
    }

    fn store(&self, slots: &mut Slots, key: RequestKey, response: ApiResponse<Value>) {
        if self.config.max_entries == 0 {
            return;
        }
        let entry = Entry {
            response,
            created_at: Instant::now(),
        };

        if let Some(existing) = slots.entries.get_mut(&key) {
            *existing = entry;
            return;
        }

        let mut evicted = 0u64;
        while slots.entries.len() >= self.config.max_entries {
            let Some(oldest) = slots.order.pop_front() else {
                break;
            };
            slots.entries.remove(&oldest);
            evicted += 1;
        }
        slots.order.push_back(key.clone());
        slots.entries.insert(key, entry);

        if evicted > 0 {
            metrics::counter!(telemetry::CACHE_EVICTIONS_TOTAL).increment(evicted);
        }
    }

    /// Remove exactly one entry. Returns whether it was present.
    pub fn remove(&self, key: &RequestKey) -> bool {
        let mut slots = self.slots();
        slots.epoch += 1;
        slots.remove(key)
    }

    /// Remove every entry for `url`, whatever its params. Returns the count removed.
    pub fn invalidate_resource(&self, url: &str) -> usize {
        let mut slots = self.slots();
        slots.epoch += 1;
        let before = slots.entries.len();
        slots.entries.retain(|k, _| k.url() != url);
        slots.order.retain(|k| k.url() != url);
        before - slots.entries.len()
    }

    pub fn clear(&self) {
        let mut slots = self.slots();
        slots.epoch += 1;
        slots.entries.clear();
        slots.order.clear();
    }

    /// Number of stored entries, expired ones included until read.
    pub fn len(&self) -> usize {
        self.slots().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

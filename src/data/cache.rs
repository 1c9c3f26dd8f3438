use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

type Flight<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;

/// Memoizes async producers per key for a caller-chosen TTL.
///
/// Concurrent misses on one key share a single in-flight computation, so the
/// upstream provider sees one request no matter how many callers race.
pub struct TtlCache<T, E> {
    entries: DashMap<String, CacheEntry<T>>,
    in_flight: DashMap<String, Flight<T, E>>,
    max_entries: Option<usize>,
}

struct CacheEntry<T> {
    data: T,
    created_at: Instant,
    ttl: Duration,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self) -> bool {
        self.created_at.elapsed() < self.ttl
    }
}

impl<T, E> TtlCache<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            in_flight: DashMap::new(),
            max_entries: None,
        }
    }

    /// Bound the number of stored entries; the oldest one is evicted first
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries.max(1)),
            ..Self::new()
        }
    }

    /// Return the cached value for `key` if younger than its TTL, otherwise
    /// run `producer` and store a successful result.
    ///
    /// Errors are handed back to every caller waiting on the same flight and
    /// are never stored.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, ttl: Duration, producer: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        if let Some(data) = self.get_fresh(key) {
            debug!("Cache hit: {}", key);
            return Ok(data);
        }

        let flight = match self.in_flight.entry(key.to_string()) {
            Entry::Occupied(entry) => {
                debug!("Joining in-flight computation: {}", key);
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                // A flight may have landed between the lookup above and this slot
                if let Some(data) = self.get_fresh(key) {
                    return Ok(data);
                }
                debug!("Cache miss: {}", key);
                let flight = producer().boxed().shared();
                entry.insert(flight.clone());
                flight
            }
        };

        let outcome = flight.clone().await;

        // Whoever retires the flight stores its result. Storing before the
        // slot is released means late arrivers always find one or the other.
        self.in_flight.remove_if(key, |_, current| {
            if !current.ptr_eq(&flight) {
                return false;
            }
            if let Ok(data) = &outcome {
                self.store(key, data.clone(), ttl);
            }
            true
        });

        outcome
    }

    /// Whole seconds since the entry for `key` was stored, expired or not
    pub fn age_seconds(&self, key: &str) -> Option<u64> {
        self.entries
            .get(key)
            .map(|entry| entry.created_at.elapsed().as_secs())
    }

    /// Get cache size
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn get_fresh(&self, key: &str) -> Option<T> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_fresh())
            .map(|entry| entry.data.clone())
    }

    fn store(&self, key: &str, data: T, ttl: Duration) {
        if let Some(max) = self.max_entries {
            if !self.entries.contains_key(key) && self.entries.len() >= max {
                self.evict_oldest();
            }
        }

        self.entries.insert(
            key.to_string(),
            CacheEntry {
                data,
                created_at: Instant::now(),
                ttl,
            },
        );
    }

    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.created_at)
            .map(|entry| entry.key().clone());

        if let Some(key) = oldest {
            debug!("Evicting oldest cache entry: {}", key);
            self.entries.remove(&key);
        }
    }
}

impl<T, E> Default for TtlCache<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

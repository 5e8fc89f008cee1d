//! Time-limited result cache.
//!
//! Entries expire after a fixed TTL and are evicted lazily when read, so an
//! expired entry never outlives a newer one written under the same key.

use std::{
    collections::HashMap,
    future::Future,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::time::Instant;
use tracing::debug;

use crate::base::types::Res;

/// A cached value along with the instant it stops being valid.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    expires_at: Instant,
}

/// A keyed cache whose entries live for a fixed TTL.
///
/// Failed fetches are never cached.
#[derive(Debug)]
pub struct ResultCache<T> {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
}

impl<T> ResultCache<T>
where
    T: Clone,
{
    /// Creates an empty cache with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Gets the value for `key`, if present and not expired.
    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                debug!("Evicting expired cache entry `{}`.", key);
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub fn insert(&self, key: &str, value: T) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };

        self.lock().insert(key.to_string(), entry);
    }

    /// Returns the cached value for `key`, or runs `fetch` and caches its result.
    ///
    /// The lock is not held while `fetch` runs, so concurrent misses each fetch.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Res<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Res<T>>,
    {
        if let Some(value) = self.get(key) {
            debug!("Cache hit for `{}`.", key);
            return Ok(value);
        }

        debug!("Cache miss for `{}`.", key);

        let value = fetch().await?;
        self.insert(key, value.clone());

        Ok(value)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// Tests.

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Time-bounded cache of remote payloads.
//!
//! Reads never fail: storage errors are logged and reported as a miss.

use chrono::Duration;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::record::CacheEntry;
use crate::store::{Store, Table};

/// TTL applied when the caller does not give one: 24 hours.
pub const DEFAULT_TTL_SECS: i64 = 86_400;

pub struct CacheManager {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

impl CacheManager {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        CacheManager {
            store,
            clock,
            default_ttl: Duration::seconds(DEFAULT_TTL_SECS),
        }
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Stores `data` under `key` until `now + ttl`.
    ///
    /// A zero or negative TTL evicts any existing entry and stores nothing.
    /// Returns whether an entry was written.
    pub fn cache_data(&self, key: &str, data: Value, ttl: Option<Duration>) -> bool {
        let ttl = ttl.unwrap_or(self.default_ttl);
        if ttl <= Duration::zero() {
            debug!(key, "non-positive ttl, evicting");
            self.invalidate(key);
            return false;
        }

        let created_at = self.clock.now();
        let entry = CacheEntry {
            key: key.to_string(),
            data,
            created_at,
            expires_at: CacheEntry::expiry_after(created_at, ttl),
        };
        match self.store.put_cache_entry(&entry) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "failed to write cache entry");
                false
            }
        }
    }

    /// Returns the cached payload if present and not expired.
    ///
    /// An expired entry is deleted as a side effect.
    pub fn get_cached_data(&self, key: &str) -> Option<Value> {
        let entry = match self.store.get_cache_entry(key) {
            Ok(entry) => entry?,
            Err(e) => {
                warn!(key, error = %e, "failed to read cache entry");
                return None;
            }
        };

        if entry.is_expired(self.clock.now()) {
            debug!(key, "cache entry expired");
            self.invalidate(key);
            return None;
        }
        Some(entry.data)
    }

    /// Serializes `value` and caches it. See [`CacheManager::cache_data`].
    pub fn cache_value<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) -> bool {
        match serde_json::to_value(value) {
            Ok(data) => self.cache_data(key, data, ttl),
            Err(e) => {
                warn!(key, error = %e, "failed to serialize cache value");
                false
            }
        }
    }

    /// Cached payload decoded as `T`; a payload of another shape is a miss.
    pub fn cached_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let data = self.get_cached_data(key)?;
        match serde_json::from_value(data) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(key, error = %e, "cached payload has unexpected shape");
                None
            }
        }
    }

    /// Removes one entry regardless of expiry.
    pub fn invalidate(&self, key: &str) -> bool {
        self.store.delete_cache_entry(key).unwrap_or_else(|e| {
            warn!(key, error = %e, "failed to delete cache entry");
            false
        })
    }

    /// Deletes every expired entry and returns how many were removed.
    pub fn clear_expired_cache(&self) -> usize {
        match self.store.delete_expired_cache_entries(self.clock.now()) {
            Ok(removed) => {
                if removed > 0 {
                    debug!(removed, "swept expired cache entries");
                }
                removed
            }
            Err(e) => {
                warn!(error = %e, "failed to sweep cache");
                0
            }
        }
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.store.count(Table::Cache).unwrap_or_else(|e| {
            warn!(error = %e, "failed to count cache entries");
            0
        })
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.clear(Table::Cache) {
            warn!(error = %e, "failed to clear cache");
        }
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The offline-first sync engine.
//!
//! [`SyncEngine`] is the caller boundary. It owns the local managers, the
//! connectivity monitor and the pass guard, and talks to the remote store
//! through an injected [`RemoteStore`].
//!
//! # Architecture
//!
//! ```text
//!                ┌──────────────────────────────────────────────┐
//!  callers ─────►│ SyncEngine                                   │
//!                │  CacheManager  OfflineRecords  SyncQueue     │
//!                │        └─────────────┼────────────┘          │
//!                │                  Store (SQLite | memory)     │
//!                │                                              │
//!  probe/host ──►│ ConnectivityMonitor ──triggers──► scheduler  │
//!                │                                     │        │
//!                │                      orchestrator pass ──────┼──► RemoteStore
//!                └──────────────────────────────────────────────┘
//! ```
//!
//! Read and write operations never fail: storage errors are logged and
//! reported as a miss or a dropped write. Only [`SyncEngine::download_for_offline`]
//! returns errors to the caller.

mod orchestrator;
mod scheduler;

pub use orchestrator::SyncReport;
pub use scheduler::EngineHandle;

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use ld_core::cache::DEFAULT_TTL_SECS;
use ld_core::queue::DEFAULT_MAX_RETRIES;
use ld_core::{
    CacheManager, Clock, Document, Filter, MemoryStore, Mutation, OfflineRecords, SqliteStore,
    Store, SyncQueue, SyncQueueItem, SystemClock, Table,
};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::connectivity::{Connectivity, ConnectivityMonitor, SyncTrigger};
use crate::error::{Error, Result};
use crate::remote::RemoteStore;

use orchestrator::PassGuard;

/// Prefix of the cache key warmed by [`SyncEngine::download_for_offline`].
pub const OFFLINE_CACHE_PREFIX: &str = "offline_";

/// Engine tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// TTL for cache entries written without one.
    pub default_ttl: chrono::Duration,
    /// Time between scheduled passes while online.
    pub sync_interval: Duration,
    /// Failed attempts before a queued mutation is dropped.
    pub max_retries: u32,
    /// Request a pass whenever a mutation is enqueued online.
    pub sync_on_enqueue: bool,
    /// Upper bound for each remote call.
    pub remote_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_ttl: chrono::Duration::seconds(DEFAULT_TTL_SECS),
            sync_interval: Duration::from_secs(30),
            max_retries: DEFAULT_MAX_RETRIES,
            sync_on_enqueue: true,
            remote_timeout: Duration::from_secs(5),
        }
    }
}

/// Snapshot returned by [`SyncEngine::get_sync_status`].
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    pub is_online: bool,
    pub sync_in_progress: bool,
    pub queue_size: usize,
    pub offline_data_size: usize,
    pub last_sync_at: Option<DateTime<Utc>>,
    /// False when running on the in-memory fallback store.
    pub persistent: bool,
    /// Offline records not yet confirmed by the remote store.
    pub unsynced_records: usize,
    /// Queued mutations dropped after exhausting their retries since start.
    pub exhausted_total: u64,
    pub last_report: Option<SyncReport>,
}

/// Shared handle to the engine. Clones share all state.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn Store>,
    remote: Arc<dyn RemoteStore>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    cache: CacheManager,
    offline: OfflineRecords,
    queue: SyncQueue,
    monitor: Arc<ConnectivityMonitor>,
    guard: PassGuard,
    /// Taken by the running scheduler and returned when it stops.
    triggers: Mutex<Option<mpsc::Receiver<SyncTrigger>>>,
    last_sync_at: Mutex<Option<DateTime<Utc>>>,
    last_report: Mutex<Option<SyncReport>>,
    exhausted_total: AtomicU64,
}

impl SyncEngine {
    /// Opens the SQLite store at `path`, falling back to memory.
    ///
    /// The fallback keeps the engine usable but nothing survives a restart;
    /// [`SyncStatus::persistent`] reports it.
    pub fn open(path: &Path, remote: Arc<dyn RemoteStore>, config: EngineConfig) -> Self {
        let store: Arc<dyn Store> = match SqliteStore::open(path) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                error!(error = %e, "local store unavailable, continuing in memory");
                Arc::new(MemoryStore::new())
            }
        };
        Self::new(store, remote, Arc::new(SystemClock), config)
    }

    /// Builds an engine over explicit collaborators. Starts offline.
    pub fn new(
        store: Arc<dyn Store>,
        remote: Arc<dyn RemoteStore>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        let cache = CacheManager::new(Arc::clone(&store), Arc::clone(&clock))
            .with_default_ttl(config.default_ttl);
        let offline = OfflineRecords::new(Arc::clone(&store), Arc::clone(&clock));
        let queue = SyncQueue::new(Arc::clone(&store), Arc::clone(&clock))
            .with_max_retries(config.max_retries);
        let (monitor, triggers) = ConnectivityMonitor::new(Connectivity::Offline);

        SyncEngine {
            inner: Arc::new(Inner {
                store,
                remote,
                clock,
                config,
                cache,
                offline,
                queue,
                monitor: Arc::new(monitor),
                guard: PassGuard::new(),
                triggers: Mutex::new(Some(triggers)),
                last_sync_at: Mutex::new(None),
                last_report: Mutex::new(None),
                exhausted_total: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// The connectivity monitor hosts report network and focus events to.
    pub fn monitor(&self) -> &Arc<ConnectivityMonitor> {
        &self.inner.monitor
    }

    pub fn remote(&self) -> &Arc<dyn RemoteStore> {
        &self.inner.remote
    }

    pub fn is_online(&self) -> bool {
        self.inner.monitor.is_online()
    }

    /// Caches `data` under `key` for `ttl`, or the default TTL.
    pub fn cache_data(&self, key: &str, data: Value, ttl: Option<chrono::Duration>) -> bool {
        self.inner.cache.cache_data(key, data, ttl)
    }

    pub fn get_cached_data(&self, key: &str) -> Option<Value> {
        self.inner.cache.get_cached_data(key)
    }

    /// Removes expired cache entries, returning how many were removed.
    pub fn clear_expired_cache(&self) -> usize {
        self.inner.cache.clear_expired_cache()
    }

    /// Records a local write for `(collection, doc_id)`, pending reconciliation.
    pub fn store_offline_data(&self, collection: &str, doc_id: &str, payload: Value) -> bool {
        match self
            .inner
            .offline
            .store_offline_data(collection, doc_id, payload)
        {
            Ok(_) => true,
            Err(e) => {
                warn!(collection, doc_id, error = %e, "offline write dropped");
                false
            }
        }
    }

    pub fn get_offline_data(&self, collection: &str, doc_id: &str) -> Option<Value> {
        self.inner
            .offline
            .get_offline_data(collection, doc_id)
            .unwrap_or_else(|e| {
                warn!(collection, doc_id, error = %e, "offline read failed");
                None
            })
    }

    pub fn get_all_offline_data(&self, collection: &str) -> Vec<Document> {
        self.inner
            .offline
            .get_all_offline_data(collection)
            .unwrap_or_else(|e| {
                warn!(collection, error = %e, "offline read failed");
                Vec::new()
            })
    }

    pub fn is_data_available_offline(&self, collection: &str) -> bool {
        self.inner
            .offline
            .is_data_available_offline(collection)
            .unwrap_or_else(|e| {
                warn!(collection, error = %e, "offline read failed");
                false
            })
    }

    /// Queues a mutation for the remote store.
    ///
    /// While online, and unless disabled, this also requests a pass.
    pub fn enqueue(
        &self,
        mutation: Mutation,
        collection: &str,
        doc_id: &str,
    ) -> Option<SyncQueueItem> {
        let item = match self.inner.queue.enqueue(mutation, collection, doc_id) {
            Ok(item) => item,
            Err(e) => {
                warn!(collection, doc_id, error = %e, "mutation dropped");
                return None;
            }
        };
        if self.inner.config.sync_on_enqueue && self.is_online() {
            self.inner.monitor.request(SyncTrigger::Enqueue);
        }
        Some(item)
    }

    /// Queued mutations in replay order.
    pub fn queued_mutations(&self) -> Vec<SyncQueueItem> {
        self.inner.queue.list().unwrap_or_else(|e| {
            warn!(error = %e, "queue read failed");
            Vec::new()
        })
    }

    /// Fetches matching documents and keeps them readable offline.
    ///
    /// Documents are stored as synced and the list is cached under
    /// `offline_<collection>`. Fails with [`Error::NotOnline`] while
    /// disconnected; a remote failure stores nothing.
    pub async fn download_for_offline(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>> {
        if !self.is_online() {
            return Err(Error::NotOnline);
        }

        let documents = tokio::time::timeout(
            self.inner.config.remote_timeout,
            self.inner.remote.query(collection, filter),
        )
        .await
        .map_err(|_| crate::remote::RemoteError::Timeout(self.inner.config.remote_timeout))??;

        if let Err(e) = self.inner.offline.store_synced(collection, &documents) {
            warn!(collection, error = %e, "downloaded documents not stored");
        }
        match serde_json::to_value(&documents) {
            Ok(value) => {
                self.inner
                    .cache
                    .cache_data(&format!("{OFFLINE_CACHE_PREFIX}{collection}"), value, None);
            }
            Err(e) => warn!(collection, error = %e, "downloaded documents not cached"),
        }

        debug!(collection, count = documents.len(), "downloaded for offline use");
        Ok(documents)
    }

    /// Empties the offline records and the sync queue.
    pub fn clear_all_offline_data(&self) -> bool {
        match self.inner.offline.clear_all_offline_data() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "clearing offline data failed");
                false
            }
        }
    }

    pub fn get_sync_status(&self) -> SyncStatus {
        let count = |table: Table| {
            self.inner.store.count(table).unwrap_or_else(|e| {
                warn!(%table, error = %e, "count failed");
                0
            })
        };

        SyncStatus {
            is_online: self.is_online(),
            sync_in_progress: self.inner.guard.is_running(),
            queue_size: count(Table::Queue),
            offline_data_size: count(Table::Offline),
            last_sync_at: *lock(&self.inner.last_sync_at),
            persistent: self.inner.store.is_persistent(),
            unsynced_records: self.inner.offline.unsynced_count().unwrap_or(0),
            exhausted_total: self.inner.exhausted_total.load(Ordering::Relaxed),
            last_report: lock(&self.inner.last_report).clone(),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory local store.
//!
//! Used when the database cannot be opened, so the engine keeps working for
//! the life of the process, and as a lightweight store in tests.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::Result;
use crate::record::{CacheEntry, Mutation, OfflineRecord, SyncQueueItem};
use crate::store::{Store, Table};

#[derive(Default)]
struct Tables {
    cache: HashMap<String, CacheEntry>,
    queue: BTreeMap<i64, SyncQueueItem>,
    last_queue_id: i64,
    offline: BTreeMap<(String, String), OfflineRecord>,
}

/// Non-persistent [`Store`] with the same contract as the SQLite store.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn offline_key(collection: &str, doc_id: &str) -> (String, String) {
    (collection.to_string(), doc_id.to_string())
}

impl Store for MemoryStore {
    fn is_persistent(&self) -> bool {
        false
    }

    fn put_cache_entry(&self, entry: &CacheEntry) -> Result<()> {
        self.tables()
            .cache
            .insert(entry.key.clone(), entry.clone());
        Ok(())
    }

    fn get_cache_entry(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.tables().cache.get(key).cloned())
    }

    fn delete_cache_entry(&self, key: &str) -> Result<bool> {
        Ok(self.tables().cache.remove(key).is_some())
    }

    fn delete_expired_cache_entries(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut tables = self.tables();
        let before = tables.cache.len();
        tables.cache.retain(|_, entry| entry.expires_at >= now);
        Ok(before - tables.cache.len())
    }

    fn push_queue_item(
        &self,
        collection: &str,
        doc_id: &str,
        mutation: &Mutation,
        enqueued_at: DateTime<Utc>,
    ) -> Result<SyncQueueItem> {
        let mut tables = self.tables();
        tables.last_queue_id += 1;
        let item = SyncQueueItem {
            id: tables.last_queue_id,
            collection: collection.to_string(),
            doc_id: doc_id.to_string(),
            mutation: mutation.clone(),
            enqueued_at,
            retry_count: 0,
            last_error: None,
        };
        tables.queue.insert(item.id, item.clone());
        Ok(item)
    }

    fn queue_items(&self) -> Result<Vec<SyncQueueItem>> {
        Ok(self.tables().queue.values().cloned().collect())
    }

    fn update_queue_item(&self, item: &SyncQueueItem) -> Result<()> {
        if let Some(stored) = self.tables().queue.get_mut(&item.id) {
            stored.retry_count = item.retry_count;
            stored.last_error = item.last_error.clone();
        }
        Ok(())
    }

    fn delete_queue_item(&self, id: i64) -> Result<bool> {
        Ok(self.tables().queue.remove(&id).is_some())
    }

    fn put_offline_record(&self, record: &OfflineRecord) -> Result<i64> {
        let mut tables = self.tables();
        let key = offline_key(&record.collection, &record.doc_id);
        let revision = tables.offline.get(&key).map_or(1, |r| r.revision + 1);
        tables.offline.insert(
            key,
            OfflineRecord {
                revision,
                ..record.clone()
            },
        );
        Ok(revision)
    }

    fn get_offline_record(&self, collection: &str, doc_id: &str) -> Result<Option<OfflineRecord>> {
        Ok(self
            .tables()
            .offline
            .get(&offline_key(collection, doc_id))
            .cloned())
    }

    fn offline_records(&self, collection: &str) -> Result<Vec<OfflineRecord>> {
        Ok(self
            .tables()
            .offline
            .values()
            .filter(|r| r.collection == collection)
            .cloned()
            .collect())
    }

    fn unsynced_offline_records(&self) -> Result<Vec<OfflineRecord>> {
        let mut records: Vec<OfflineRecord> = self
            .tables()
            .offline
            .values()
            .filter(|r| !r.synced)
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.collection.cmp(&b.collection))
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
        Ok(records)
    }

    fn mark_offline_synced(&self, collection: &str, doc_id: &str, revision: i64) -> Result<bool> {
        let mut tables = self.tables();
        match tables.offline.get_mut(&offline_key(collection, doc_id)) {
            Some(record) if record.revision == revision => {
                record.synced = true;
                record.sync_attempts = 0;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn record_offline_failure(&self, collection: &str, doc_id: &str, revision: i64) -> Result<()> {
        let mut tables = self.tables();
        if let Some(record) = tables.offline.get_mut(&offline_key(collection, doc_id)) {
            if record.revision == revision && !record.synced {
                record.sync_attempts += 1;
            }
        }
        Ok(())
    }

    fn delete_offline_record(&self, collection: &str, doc_id: &str) -> Result<bool> {
        Ok(self
            .tables()
            .offline
            .remove(&offline_key(collection, doc_id))
            .is_some())
    }

    fn clear(&self, table: Table) -> Result<()> {
        let mut tables = self.tables();
        match table {
            Table::Cache => tables.cache.clear(),
            Table::Queue => tables.queue.clear(),
            Table::Offline => tables.offline.clear(),
        }
        Ok(())
    }

    fn count(&self, table: Table) -> Result<usize> {
        let tables = self.tables();
        Ok(match table {
            Table::Cache => tables.cache.len(),
            Table::Queue => tables.queue.len(),
            Table::Offline => tables.offline.len(),
        })
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

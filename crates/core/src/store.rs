// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The local store contract shared by the SQLite and in-memory backends.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::record::{CacheEntry, Mutation, OfflineRecord, SyncQueueItem};

/// One of the three independently indexed tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Cache,
    Queue,
    Offline,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Cache, Table::Queue, Table::Offline];

    /// Name of the backing SQLite table.
    pub fn table_name(&self) -> &'static str {
        match self {
            Table::Cache => "cache_entries",
            Table::Queue => "sync_queue",
            Table::Offline => "offline_records",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Table::Cache => "cache",
            Table::Queue => "queue",
            Table::Offline => "offline",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Table {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cache" => Ok(Table::Cache),
            "queue" => Ok(Table::Queue),
            "offline" => Ok(Table::Offline),
            _ => Err(Error::InvalidInput(format!(
                "unknown table '{s}'\n  hint: valid tables are: cache, queue, offline"
            ))),
        }
    }
}

/// Durable keyed storage for cache entries, queued mutations and offline
/// records.
///
/// Every method is single-record atomic. Lookups of absent keys return
/// `Ok(None)` or `Ok(false)`, never an error.
pub trait Store: Send + Sync {
    /// False for the in-memory fallback.
    fn is_persistent(&self) -> bool;

    fn put_cache_entry(&self, entry: &CacheEntry) -> Result<()>;
    fn get_cache_entry(&self, key: &str) -> Result<Option<CacheEntry>>;
    fn delete_cache_entry(&self, key: &str) -> Result<bool>;
    /// Deletes every entry with `expires_at < now`, returning the count.
    fn delete_expired_cache_entries(&self, now: DateTime<Utc>) -> Result<usize>;

    /// Appends a mutation with `retry_count = 0` and returns the stored item.
    fn push_queue_item(
        &self,
        collection: &str,
        doc_id: &str,
        mutation: &Mutation,
        enqueued_at: DateTime<Utc>,
    ) -> Result<SyncQueueItem>;
    /// All queued items in insertion order.
    fn queue_items(&self) -> Result<Vec<SyncQueueItem>>;
    /// Persists `retry_count` and `last_error`. A missing item is a no-op.
    fn update_queue_item(&self, item: &SyncQueueItem) -> Result<()>;
    fn delete_queue_item(&self, id: i64) -> Result<bool>;

    /// Upserts by `(collection, doc_id)` and returns the stored revision.
    ///
    /// The store ignores `record.revision`: a new record starts at 1 and
    /// each overwrite increments it.
    fn put_offline_record(&self, record: &OfflineRecord) -> Result<i64>;
    fn get_offline_record(&self, collection: &str, doc_id: &str) -> Result<Option<OfflineRecord>>;
    /// Records of one collection ordered by document id.
    fn offline_records(&self, collection: &str) -> Result<Vec<OfflineRecord>>;
    /// Records with `synced = false`, oldest write first.
    fn unsynced_offline_records(&self) -> Result<Vec<OfflineRecord>>;
    /// Marks a record synced if it is still at `revision`.
    ///
    /// Returns false when a newer local write replaced it in the meantime.
    fn mark_offline_synced(&self, collection: &str, doc_id: &str, revision: i64) -> Result<bool>;
    /// Counts a failed reconciliation of the write at `revision`.
    fn record_offline_failure(&self, collection: &str, doc_id: &str, revision: i64) -> Result<()>;
    fn delete_offline_record(&self, collection: &str, doc_id: &str) -> Result<bool>;

    fn clear(&self, table: Table) -> Result<()>;
    fn count(&self, table: Table) -> Result<usize>;
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

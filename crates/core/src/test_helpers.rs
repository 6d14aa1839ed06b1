// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test doubles for ld-core unit tests.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::record::{CacheEntry, Mutation, OfflineRecord, SyncQueueItem};
use crate::store::{Store, Table};

/// Store whose every call fails, as when the disk goes away.
pub struct BrokenStore;

fn broken<T>() -> Result<T> {
    Err(Error::StorageUnavailable("disk detached".into()))
}

impl Store for BrokenStore {
    fn is_persistent(&self) -> bool {
        true
    }
    fn put_cache_entry(&self, _: &CacheEntry) -> Result<()> {
        broken()
    }
    fn get_cache_entry(&self, _: &str) -> Result<Option<CacheEntry>> {
        broken()
    }
    fn delete_cache_entry(&self, _: &str) -> Result<bool> {
        broken()
    }
    fn delete_expired_cache_entries(&self, _: DateTime<Utc>) -> Result<usize> {
        broken()
    }
    fn push_queue_item(
        &self,
        _: &str,
        _: &str,
        _: &Mutation,
        _: DateTime<Utc>,
    ) -> Result<SyncQueueItem> {
        broken()
    }
    fn queue_items(&self) -> Result<Vec<SyncQueueItem>> {
        broken()
    }
    fn update_queue_item(&self, _: &SyncQueueItem) -> Result<()> {
        broken()
    }
    fn delete_queue_item(&self, _: i64) -> Result<bool> {
        broken()
    }
    fn put_offline_record(&self, _: &OfflineRecord) -> Result<i64> {
        broken()
    }
    fn get_offline_record(&self, _: &str, _: &str) -> Result<Option<OfflineRecord>> {
        broken()
    }
    fn offline_records(&self, _: &str) -> Result<Vec<OfflineRecord>> {
        broken()
    }
    fn unsynced_offline_records(&self) -> Result<Vec<OfflineRecord>> {
        broken()
    }
    fn mark_offline_synced(&self, _: &str, _: &str, _: i64) -> Result<bool> {
        broken()
    }
    fn record_offline_failure(&self, _: &str, _: &str, _: i64) -> Result<()> {
        broken()
    }
    fn delete_offline_record(&self, _: &str, _: &str) -> Result<bool> {
        broken()
    }
    fn clear(&self, _: Table) -> Result<()> {
        broken()
    }
    fn count(&self, _: Table) -> Result<usize> {
        broken()
    }
}

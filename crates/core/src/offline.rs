// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline record manager.
//!
//! Keeps documents readable while disconnected and tracks which local writes
//! still have to reach the remote store.

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::clock::Clock;
use crate::error::Result;
use crate::record::{Document, OfflineRecord};
use crate::store::{Store, Table};

pub struct OfflineRecords {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl OfflineRecords {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        OfflineRecords { store, clock }
    }

    /// Records a local write. The record is unsynced until reconciled.
    pub fn store_offline_data(
        &self,
        collection: &str,
        doc_id: &str,
        payload: Value,
    ) -> Result<OfflineRecord> {
        let mut record = OfflineRecord::local(collection, doc_id, payload, self.clock.now());
        record.revision = self.store.put_offline_record(&record)?;
        debug!(collection, doc_id, revision = record.revision, "stored offline record");
        Ok(record)
    }

    /// Stores documents fetched from the remote store as already synced.
    pub fn store_synced(&self, collection: &str, documents: &[Document]) -> Result<()> {
        let now = self.clock.now();
        for doc in documents {
            let record = OfflineRecord {
                synced: true,
                ..OfflineRecord::local(collection, &doc.id, doc.payload.clone(), now)
            };
            self.store.put_offline_record(&record)?;
        }
        Ok(())
    }

    pub fn get_offline_data(&self, collection: &str, doc_id: &str) -> Result<Option<Value>> {
        Ok(self
            .store
            .get_offline_record(collection, doc_id)?
            .map(|record| record.payload))
    }

    pub fn get_offline_record(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> Result<Option<OfflineRecord>> {
        self.store.get_offline_record(collection, doc_id)
    }

    /// Every document of `collection`, ordered by id.
    pub fn get_all_offline_data(&self, collection: &str) -> Result<Vec<Document>> {
        Ok(self
            .store
            .offline_records(collection)?
            .into_iter()
            .map(Document::from)
            .collect())
    }

    pub fn is_data_available_offline(&self, collection: &str) -> Result<bool> {
        Ok(!self.store.offline_records(collection)?.is_empty())
    }

    /// Unsynced records that have failed fewer than `max_attempts` times.
    pub fn unsynced(&self, max_attempts: u32) -> Result<Vec<OfflineRecord>> {
        Ok(self
            .store
            .unsynced_offline_records()?
            .into_iter()
            .filter(|r| r.sync_attempts < max_attempts)
            .collect())
    }

    /// Count of every unsynced record, including stalled ones.
    pub fn unsynced_count(&self) -> Result<usize> {
        Ok(self.store.unsynced_offline_records()?.len())
    }

    /// Flags `record` synced unless a newer local write replaced it.
    pub fn mark_synced(&self, record: &OfflineRecord) -> Result<bool> {
        self.store
            .mark_offline_synced(&record.collection, &record.doc_id, record.revision)
    }

    pub fn record_failure(&self, record: &OfflineRecord) -> Result<()> {
        self.store
            .record_offline_failure(&record.collection, &record.doc_id, record.revision)
    }

    pub fn len(&self) -> Result<usize> {
        self.store.count(Table::Offline)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Empties the offline records and the sync queue.
    pub fn clear_all_offline_data(&self) -> Result<()> {
        self.store.clear(Table::Offline)?;
        self.store.clear(Table::Queue)?;
        debug!("cleared offline records and sync queue");
        Ok(())
    }
}

#[cfg(test)]
#[path = "offline_tests.rs"]
mod tests;

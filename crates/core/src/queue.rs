// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync queue of mutations waiting for the remote store.
//!
//! Items are replayed in insertion order. A failed item stays queued with an
//! incremented retry count until it succeeds or reaches the retry limit, at
//! which point it is dropped and reported as exhausted.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::record::{Mutation, SyncQueueItem};
use crate::store::{Store, Table};

/// Failed attempts after which an item is dropped.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Outcome of one drain.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct DrainReport {
    /// Applied remotely and removed from the queue.
    pub succeeded: Vec<SyncQueueItem>,
    /// Failed and kept for the next pass, with the updated retry count.
    pub failed: Vec<SyncQueueItem>,
    /// Failed for the last allowed time and removed.
    pub exhausted: Vec<SyncQueueItem>,
    /// Skipped because an earlier item for the same document failed.
    pub deferred: Vec<SyncQueueItem>,
}

impl DrainReport {
    /// Number of items handed to the apply function.
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.exhausted.len()
    }

    /// True when items were attempted and none succeeded.
    pub fn all_failed(&self) -> bool {
        self.attempted() > 0 && self.succeeded.is_empty()
    }
}

pub struct SyncQueue {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    max_retries: u32,
}

impl SyncQueue {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        SyncQueue {
            store,
            clock,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Sets the retry limit; values below one are treated as one.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Appends a mutation with `retry_count = 0`.
    pub fn enqueue(
        &self,
        mutation: Mutation,
        collection: &str,
        doc_id: &str,
    ) -> Result<SyncQueueItem> {
        let item = self
            .store
            .push_queue_item(collection, doc_id, &mutation, self.clock.now())?;
        debug!(
            id = item.id,
            op = %item.operation(),
            collection,
            doc_id,
            "enqueued mutation"
        );
        Ok(item)
    }

    /// Queued items in replay order.
    pub fn list(&self) -> Result<Vec<SyncQueueItem>> {
        self.store.queue_items()
    }

    pub fn len(&self) -> Result<usize> {
        self.store.count(Table::Queue)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.clear(Table::Queue)
    }

    /// Replays every queued item through `apply`, oldest first.
    ///
    /// Successes are removed. A failure increments `retry_count`; at
    /// `max_retries` the item is removed and reported in
    /// [`DrainReport::exhausted`]. After a failure, later items for the same
    /// document are left untouched until the next drain so they cannot
    /// overtake it.
    ///
    /// Only storage errors abort the drain.
    pub async fn drain<F, Fut, E>(&self, mut apply: F) -> Result<DrainReport>
    where
        F: FnMut(SyncQueueItem) -> Fut,
        Fut: Future<Output = std::result::Result<(), E>>,
        E: fmt::Display,
    {
        let mut report = DrainReport::default();
        let mut blocked: HashSet<(String, String)> = HashSet::new();

        for mut item in self.store.queue_items()? {
            let document = (item.collection.clone(), item.doc_id.clone());
            if blocked.contains(&document) {
                debug!(id = item.id, "deferred behind failed item");
                report.deferred.push(item);
                continue;
            }

            match apply(item.clone()).await {
                Ok(()) => {
                    self.store.delete_queue_item(item.id)?;
                    debug!(id = item.id, op = %item.operation(), "applied queued mutation");
                    report.succeeded.push(item);
                }
                Err(e) => {
                    blocked.insert(document);
                    item.retry_count += 1;
                    item.last_error = Some(e.to_string());

                    if item.retry_count >= self.max_retries {
                        self.store.delete_queue_item(item.id)?;
                        let err = Error::RetryExhausted {
                            operation: item.operation().to_string(),
                            collection: item.collection.clone(),
                            doc_id: item.doc_id.clone(),
                            attempts: item.retry_count,
                            last_error: e.to_string(),
                        };
                        error!(id = item.id, error = %err, "dropping queued mutation");
                        report.exhausted.push(item);
                    } else {
                        self.store.update_queue_item(&item)?;
                        warn!(
                            id = item.id,
                            retry_count = item.retry_count,
                            error = %e,
                            "queued mutation failed"
                        );
                        report.failed.push(item);
                    }
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync passes.
//!
//! A pass drains the sync queue against the remote store, pushes unsynced
//! offline records, then sweeps the cache. [`PassGuard`] keeps at most one
//! pass in flight; triggers arriving meanwhile collapse into one re-run.

use std::sync::atomic::Ordering;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use ld_core::{DrainReport, OfflineRecord, SyncQueueItem};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{lock, SyncEngine};
use crate::error::{Error, Result};
use crate::remote::{apply_mutation, RemoteError};

/// Outcome of one sync pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub drained: DrainReport,
    pub records_synced: usize,
    pub records_failed: usize,
    pub cache_evicted: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    /// True when remote calls were made and every one of them failed.
    pub fn all_failed(&self) -> bool {
        let attempted = self.drained.attempted() + self.records_synced + self.records_failed;
        attempted > 0 && self.drained.succeeded.is_empty() && self.records_synced == 0
    }
}

#[derive(Debug, Default)]
struct PassState {
    running: bool,
    rerun: bool,
}

/// Re-entry guard for sync passes.
#[derive(Debug, Default)]
pub(crate) struct PassGuard {
    state: Mutex<PassState>,
}

impl PassGuard {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Claims the guard, or records a re-run request if a pass is running.
    pub(crate) fn begin(&self) -> Option<PassTicket<'_>> {
        let mut state = lock(&self.state);
        if state.running {
            state.rerun = true;
            return None;
        }
        state.running = true;
        state.rerun = false;
        Some(PassTicket {
            guard: self,
            active: true,
        })
    }

    pub(crate) fn is_running(&self) -> bool {
        lock(&self.state).running
    }
}

/// Held by the task running passes; releases the guard when dropped.
pub(crate) struct PassTicket<'a> {
    guard: &'a PassGuard,
    active: bool,
}

impl PassTicket<'_> {
    /// Consumes a pending re-run request, or releases the guard.
    ///
    /// Both happen under one lock so a trigger is never lost between the
    /// end of a pass and the release.
    pub(crate) fn rerun_requested(&mut self) -> bool {
        let mut state = lock(&self.guard.state);
        if state.rerun {
            state.rerun = false;
            return true;
        }
        state.running = false;
        self.active = false;
        false
    }
}

impl Drop for PassTicket<'_> {
    fn drop(&mut self) {
        if self.active {
            let mut state = lock(&self.guard.state);
            state.running = false;
            state.rerun = false;
        }
    }
}

impl SyncEngine {
    /// Runs a sync pass now, plus one re-run if triggers arrived meanwhile.
    ///
    /// Returns `None` when offline or when a pass is already running; in the
    /// latter case the running pass is asked to go again.
    pub async fn trigger_sync(&self) -> Option<SyncReport> {
        if !self.is_online() {
            debug!("offline, skipping sync");
            return None;
        }
        let Some(mut ticket) = self.inner.guard.begin() else {
            debug!("sync already running, coalesced");
            return None;
        };

        let mut last = None;
        loop {
            match self.run_pass().await {
                Ok(report) => last = Some(report),
                Err(e) => warn!(error = %e, "sync pass aborted"),
            }
            if !self.is_online() || !ticket.rerun_requested() {
                break;
            }
            debug!("running coalesced sync pass");
        }
        last
    }

    async fn run_pass(&self) -> Result<SyncReport> {
        let inner = &self.inner;
        let started_at = inner.clock.now();

        let drained = inner
            .queue
            .drain(|item| async move { self.apply_with_timeout(&item).await })
            .await?;
        if !drained.exhausted.is_empty() {
            inner
                .exhausted_total
                .fetch_add(drained.exhausted.len() as u64, Ordering::Relaxed);
        }

        let (records_synced, records_failed) = self.reconcile_records().await?;
        let cache_evicted = inner.cache.clear_expired_cache();

        let finished_at = inner.clock.now();
        let report = SyncReport {
            drained,
            records_synced,
            records_failed,
            cache_evicted,
            started_at,
            finished_at,
        };

        if report.all_failed() {
            warn!(
                failed = report.drained.failed.len() + report.drained.exhausted.len(),
                records_failed, "every remote call failed, retrying next pass"
            );
        } else {
            info!(
                applied = report.drained.succeeded.len(),
                failed = report.drained.failed.len(),
                exhausted = report.drained.exhausted.len(),
                deferred = report.drained.deferred.len(),
                records_synced,
                records_failed,
                cache_evicted,
                "sync pass complete"
            );
        }

        *lock(&inner.last_sync_at) = Some(finished_at);
        *lock(&inner.last_report) = Some(report.clone());
        Ok(report)
    }

    async fn apply_with_timeout(&self, item: &SyncQueueItem) -> Result<()> {
        let timeout = self.inner.config.remote_timeout;
        match tokio::time::timeout(timeout, apply_mutation(self.inner.remote.as_ref(), item)).await
        {
            Ok(result) => result.map_err(Error::RemoteApplyFailed),
            Err(_) => Err(Error::RemoteApplyFailed(RemoteError::Timeout(timeout))),
        }
    }

    /// Pushes unsynced offline records. Returns `(synced, failed)`.
    async fn reconcile_records(&self) -> Result<(usize, usize)> {
        let inner = &self.inner;
        let mut synced = 0;
        let mut failed = 0;

        for record in inner.offline.unsynced(inner.config.max_retries)? {
            match self.push_record(&record).await {
                Ok(()) => {
                    if inner.offline.mark_synced(&record)? {
                        debug!(
                            collection = %record.collection,
                            doc_id = %record.doc_id,
                            "offline record synced"
                        );
                    }
                    synced += 1;
                }
                Err(e) => {
                    inner.offline.record_failure(&record)?;
                    warn!(
                        collection = %record.collection,
                        doc_id = %record.doc_id,
                        attempts = record.sync_attempts + 1,
                        error = %e,
                        "offline record not synced"
                    );
                    failed += 1;
                }
            }
        }
        Ok((synced, failed))
    }

    async fn push_record(&self, record: &OfflineRecord) -> Result<()> {
        let timeout = self.inner.config.remote_timeout;
        let call = self
            .inner
            .remote
            .create(&record.collection, &record.doc_id, &record.payload);
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result.map_err(Error::RemoteApplyFailed),
            Err(_) => Err(Error::RemoteApplyFailed(RemoteError::Timeout(timeout))),
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;

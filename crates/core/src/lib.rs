// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ld-core: local storage and queueing for the larder sync engine
//!
//! This crate provides the record types, the local store backends, the cache,
//! offline-record and sync-queue managers, query filters, and the wire
//! protocol shared by the engine and the reference remote server.

pub mod cache;
pub mod clock;
pub mod db;
pub mod error;
pub mod filter;
pub mod journal;
pub mod memory;
pub mod offline;
pub mod protocol;
pub mod queue;
pub mod record;
pub mod store;

#[cfg(test)]
mod test_helpers;

pub use cache::CacheManager;
pub use clock::{Clock, ManualClock, SystemClock};
pub use db::SqliteStore;
pub use error::{Error, Result};
pub use filter::{Clause, CompareOp, Filter};
pub use journal::Journal;
pub use memory::MemoryStore;
pub use offline::OfflineRecords;
pub use queue::{DrainReport, SyncQueue};
pub use record::{CacheEntry, Document, Mutation, OfflineRecord, Operation, SyncQueueItem};
pub use store::{Store, Table};

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Record types held by the local store.
//!
//! Three tables back the engine: cache entries with an expiry, the queue of
//! mutations waiting to reach the remote store, and offline records that are
//! readable while disconnected.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Kind of write a queued mutation performs remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Write the whole document, replacing any existing one.
    Create,
    /// Merge top-level fields into an existing document.
    Update,
    /// Remove the document.
    Delete,
}

impl Operation {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "create" => Ok(Operation::Create),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            _ => Err(Error::InvalidOperation(s.to_string())),
        }
    }
}

/// A queued write: the operation fused with its payload.
///
/// Create and update always carry a payload; delete never does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "payload", rename_all = "snake_case")]
pub enum Mutation {
    Create(Value),
    Update(Value),
    Delete,
}

impl Mutation {
    pub fn operation(&self) -> Operation {
        match self {
            Mutation::Create(_) => Operation::Create,
            Mutation::Update(_) => Operation::Update,
            Mutation::Delete => Operation::Delete,
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Mutation::Create(payload) | Mutation::Update(payload) => Some(payload),
            Mutation::Delete => None,
        }
    }

    /// Rebuilds a mutation from its stored columns.
    pub fn from_parts(operation: Operation, payload: Option<Value>) -> Result<Self> {
        match (operation, payload) {
            (Operation::Create, Some(payload)) => Ok(Mutation::Create(payload)),
            (Operation::Update, Some(payload)) => Ok(Mutation::Update(payload)),
            (Operation::Delete, _) => Ok(Mutation::Delete),
            (op, None) => Err(Error::MissingPayload(op.to_string())),
        }
    }
}

/// A cached remote payload with an absolute expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Latest storable expiry, the last instant of year 9999.
    ///
    /// Beyond it RFC 3339 text gains a sign and a fifth year digit and no
    /// longer sorts in time order.
    pub fn latest_expiry() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(9999, 12, 31)
            .and_then(|date| date.and_hms_micro_opt(23, 59, 59, 999_999))
            .map(|naive| naive.and_utc())
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Expiry for an entry created at `created_at` living for `ttl`,
    /// saturating at [`CacheEntry::latest_expiry`].
    pub fn expiry_after(created_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
        let latest = Self::latest_expiry();
        created_at
            .checked_add_signed(ttl)
            .map_or(latest, |expires_at| expires_at.min(latest))
    }

    /// A read at `now` is a hit iff `now <= expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// A pending remote mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncQueueItem {
    /// Insertion-ordered identifier assigned by the store.
    pub id: i64,
    pub collection: String,
    pub doc_id: String,
    #[serde(flatten)]
    pub mutation: Mutation,
    pub enqueued_at: DateTime<Utc>,
    pub retry_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl SyncQueueItem {
    pub fn operation(&self) -> Operation {
        self.mutation.operation()
    }

    /// True when two items target the same remote document.
    pub fn same_document(&self, other: &SyncQueueItem) -> bool {
        self.collection == other.collection && self.doc_id == other.doc_id
    }
}

/// A locally available document, last write wins per `(collection, doc_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineRecord {
    pub collection: String,
    pub doc_id: String,
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
    pub synced: bool,
    /// Failed reconciliation attempts since the last local write.
    #[serde(default)]
    pub sync_attempts: u32,
    /// Write counter assigned by the store, bumped on every upsert.
    #[serde(default)]
    pub revision: i64,
}

impl OfflineRecord {
    /// A fresh local write: not yet reconciled.
    pub fn local(
        collection: impl Into<String>,
        doc_id: impl Into<String>,
        payload: Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        OfflineRecord {
            collection: collection.into(),
            doc_id: doc_id.into(),
            payload,
            timestamp,
            synced: false,
            sync_attempts: 0,
            revision: 0,
        }
    }
}

/// A document as returned by queries: identifier plus payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub payload: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, payload: Value) -> Self {
        Document {
            id: id.into(),
            payload,
        }
    }
}

impl From<OfflineRecord> for Document {
    fn from(record: OfflineRecord) -> Self {
        Document {
            id: record.doc_id,
            payload: record.payload,
        }
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;

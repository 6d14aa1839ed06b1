// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed local store.
//!
//! [`SqliteStore`] keeps the cache, the sync queue and offline records in one
//! database file. Timestamps are stored as RFC 3339 text with fixed
//! microsecond precision, so lexical order matches time order and range
//! predicates can run in SQL.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{Error, Result};
use crate::record::{CacheEntry, Mutation, Operation, OfflineRecord, SyncQueueItem};
use crate::store::{Store, Table};

/// SQL schema for the local store.
pub const SCHEMA: &str = r#"
-- Remote payloads cached with an absolute expiry
CREATE TABLE IF NOT EXISTS cache_entries (
    key TEXT PRIMARY KEY,
    data TEXT NOT NULL,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

-- Mutations waiting to reach the remote store, replayed in id order
CREATE TABLE IF NOT EXISTS sync_queue (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    operation TEXT NOT NULL,
    collection TEXT NOT NULL,
    doc_id TEXT NOT NULL,
    payload TEXT,
    enqueued_at TEXT NOT NULL,
    retry_count INTEGER NOT NULL DEFAULT 0,
    last_error TEXT,
    CHECK (operation = 'delete' OR payload IS NOT NULL)
);

-- Documents readable while offline, last write wins
CREATE TABLE IF NOT EXISTS offline_records (
    collection TEXT NOT NULL,
    doc_id TEXT NOT NULL,
    payload TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    synced INTEGER NOT NULL DEFAULT 0,
    sync_attempts INTEGER NOT NULL DEFAULT 0,
    revision INTEGER NOT NULL DEFAULT 1,
    PRIMARY KEY (collection, doc_id)
);

CREATE INDEX IF NOT EXISTS idx_cache_expires ON cache_entries(expires_at);
CREATE INDEX IF NOT EXISTS idx_queue_document ON sync_queue(collection, doc_id);
CREATE INDEX IF NOT EXISTS idx_offline_synced ON offline_records(synced, timestamp);
"#;

/// Formats a timestamp for storage.
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            conversion_failure(Error::CorruptedData(format!(
                "invalid timestamp '{value}' in column '{column}'"
            )))
        })
}

fn parse_json(value: &str, column: &str) -> std::result::Result<Value, rusqlite::Error> {
    serde_json::from_str(value).map_err(|e| {
        conversion_failure(Error::CorruptedData(format!(
            "invalid json in column '{column}': {e}"
        )))
    })
}

fn conversion_failure(err: Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
}

fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    // Stores written before retry bookkeeping existed lack these columns.
    migrate_add_column(conn, "sync_queue", "last_error", "TEXT")?;
    migrate_add_column(
        conn,
        "offline_records",
        "sync_attempts",
        "INTEGER NOT NULL DEFAULT 0",
    )?;
    migrate_add_column(
        conn,
        "offline_records",
        "revision",
        "INTEGER NOT NULL DEFAULT 1",
    )?;
    Ok(())
}

/// Adds a column to a table created by an older schema.
fn migrate_add_column(conn: &Connection, table: &str, column: &str, decl: &str) -> Result<()> {
    let has_column: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM pragma_table_info(?1) WHERE name = ?2",
            params![table, column],
            |row| row.get(0),
        )
        .unwrap_or(false);

    if !has_column {
        conn.execute(&format!("ALTER TABLE {table} ADD COLUMN {column} {decl}"), [])?;
    }
    Ok(())
}

fn cache_entry_from_row(row: &Row<'_>) -> std::result::Result<CacheEntry, rusqlite::Error> {
    let data: String = row.get("data")?;
    let created_at: String = row.get("created_at")?;
    let expires_at: String = row.get("expires_at")?;
    Ok(CacheEntry {
        key: row.get("key")?,
        data: parse_json(&data, "data")?,
        created_at: parse_timestamp(&created_at, "created_at")?,
        expires_at: parse_timestamp(&expires_at, "expires_at")?,
    })
}

fn queue_item_from_row(row: &Row<'_>) -> std::result::Result<SyncQueueItem, rusqlite::Error> {
    let operation: String = row.get("operation")?;
    let operation: Operation = operation.parse().map_err(conversion_failure)?;
    let payload: Option<String> = row.get("payload")?;
    let payload = payload.map(|p| parse_json(&p, "payload")).transpose()?;
    let enqueued_at: String = row.get("enqueued_at")?;
    Ok(SyncQueueItem {
        id: row.get("id")?,
        collection: row.get("collection")?,
        doc_id: row.get("doc_id")?,
        mutation: Mutation::from_parts(operation, payload).map_err(conversion_failure)?,
        enqueued_at: parse_timestamp(&enqueued_at, "enqueued_at")?,
        retry_count: row.get("retry_count")?,
        last_error: row.get("last_error")?,
    })
}

fn offline_record_from_row(row: &Row<'_>) -> std::result::Result<OfflineRecord, rusqlite::Error> {
    let payload: String = row.get("payload")?;
    let timestamp: String = row.get("timestamp")?;
    Ok(OfflineRecord {
        collection: row.get("collection")?,
        doc_id: row.get("doc_id")?,
        payload: parse_json(&payload, "payload")?,
        timestamp: parse_timestamp(&timestamp, "timestamp")?,
        synced: row.get("synced")?,
        sync_attempts: row.get("sync_attempts")?,
        revision: row.get("revision")?,
    })
}

const QUEUE_COLUMNS: &str =
    "id, operation, collection, doc_id, payload, enqueued_at, retry_count, last_error";
const OFFLINE_COLUMNS: &str =
    "collection, doc_id, payload, timestamp, synced, sync_attempts, revision";

/// Local store backed by a single SQLite database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the store at `path`.
    ///
    /// Any failure to open the medium is reported as
    /// [`Error::StorageUnavailable`].
    pub fn open(path: &Path) -> Result<Self> {
        Self::try_open(path)
            .map_err(|e| Error::StorageUnavailable(format!("{}: {e}", path.display())))
    }

    fn try_open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        run_migrations(&conn)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory database (used in tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Store for SqliteStore {
    fn is_persistent(&self) -> bool {
        true
    }

    fn put_cache_entry(&self, entry: &CacheEntry) -> Result<()> {
        self.conn().execute(
            "INSERT INTO cache_entries (key, data, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET
                data = excluded.data,
                created_at = excluded.created_at,
                expires_at = excluded.expires_at",
            params![
                entry.key,
                serde_json::to_string(&entry.data)?,
                format_timestamp(entry.created_at),
                format_timestamp(entry.expires_at.min(CacheEntry::latest_expiry())),
            ],
        )?;
        Ok(())
    }

    fn get_cache_entry(&self, key: &str) -> Result<Option<CacheEntry>> {
        let entry = self
            .conn()
            .query_row(
                "SELECT key, data, created_at, expires_at FROM cache_entries WHERE key = ?1",
                [key],
                cache_entry_from_row,
            )
            .optional()?;
        Ok(entry)
    }

    fn delete_cache_entry(&self, key: &str) -> Result<bool> {
        let deleted = self
            .conn()
            .execute("DELETE FROM cache_entries WHERE key = ?1", [key])?;
        Ok(deleted > 0)
    }

    fn delete_expired_cache_entries(&self, now: DateTime<Utc>) -> Result<usize> {
        let deleted = self.conn().execute(
            "DELETE FROM cache_entries WHERE expires_at < ?1",
            [format_timestamp(now)],
        )?;
        Ok(deleted)
    }

    fn push_queue_item(
        &self,
        collection: &str,
        doc_id: &str,
        mutation: &Mutation,
        enqueued_at: DateTime<Utc>,
    ) -> Result<SyncQueueItem> {
        let payload = mutation.payload().map(serde_json::to_string).transpose()?;
        let conn = self.conn();
        conn.execute(
            "INSERT INTO sync_queue (operation, collection, doc_id, payload, enqueued_at, retry_count)
             VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            params![
                mutation.operation().as_str(),
                collection,
                doc_id,
                payload,
                format_timestamp(enqueued_at),
            ],
        )?;
        let id = conn.last_insert_rowid();
        let item = conn.query_row(
            &format!("SELECT {QUEUE_COLUMNS} FROM sync_queue WHERE id = ?1"),
            [id],
            queue_item_from_row,
        )?;
        Ok(item)
    }

    fn queue_items(&self) -> Result<Vec<SyncQueueItem>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {QUEUE_COLUMNS} FROM sync_queue ORDER BY id"
        ))?;
        let items = stmt
            .query_map([], queue_item_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn update_queue_item(&self, item: &SyncQueueItem) -> Result<()> {
        self.conn().execute(
            "UPDATE sync_queue SET retry_count = ?1, last_error = ?2 WHERE id = ?3",
            params![item.retry_count, item.last_error, item.id],
        )?;
        Ok(())
    }

    fn delete_queue_item(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn()
            .execute("DELETE FROM sync_queue WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    fn put_offline_record(&self, record: &OfflineRecord) -> Result<i64> {
        let revision = self.conn().query_row(
            "INSERT INTO offline_records (collection, doc_id, payload, timestamp, synced, sync_attempts, revision)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1)
             ON CONFLICT(collection, doc_id) DO UPDATE SET
                payload = excluded.payload,
                timestamp = excluded.timestamp,
                synced = excluded.synced,
                sync_attempts = excluded.sync_attempts,
                revision = offline_records.revision + 1
             RETURNING revision",
            params![
                record.collection,
                record.doc_id,
                serde_json::to_string(&record.payload)?,
                format_timestamp(record.timestamp),
                record.synced,
                record.sync_attempts,
            ],
            |row| row.get(0),
        )?;
        Ok(revision)
    }

    fn get_offline_record(&self, collection: &str, doc_id: &str) -> Result<Option<OfflineRecord>> {
        let record = self
            .conn()
            .query_row(
                &format!(
                    "SELECT {OFFLINE_COLUMNS} FROM offline_records
                     WHERE collection = ?1 AND doc_id = ?2"
                ),
                [collection, doc_id],
                offline_record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn offline_records(&self, collection: &str) -> Result<Vec<OfflineRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {OFFLINE_COLUMNS} FROM offline_records
             WHERE collection = ?1 ORDER BY doc_id"
        ))?;
        let records = stmt
            .query_map([collection], offline_record_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn unsynced_offline_records(&self) -> Result<Vec<OfflineRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {OFFLINE_COLUMNS} FROM offline_records
             WHERE synced = 0 ORDER BY timestamp, collection, doc_id"
        ))?;
        let records = stmt
            .query_map([], offline_record_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn mark_offline_synced(&self, collection: &str, doc_id: &str, revision: i64) -> Result<bool> {
        let updated = self.conn().execute(
            "UPDATE offline_records SET synced = 1, sync_attempts = 0
             WHERE collection = ?1 AND doc_id = ?2 AND revision = ?3",
            params![collection, doc_id, revision],
        )?;
        Ok(updated > 0)
    }

    fn record_offline_failure(&self, collection: &str, doc_id: &str, revision: i64) -> Result<()> {
        self.conn().execute(
            "UPDATE offline_records SET sync_attempts = sync_attempts + 1
             WHERE collection = ?1 AND doc_id = ?2 AND revision = ?3 AND synced = 0",
            params![collection, doc_id, revision],
        )?;
        Ok(())
    }

    fn delete_offline_record(&self, collection: &str, doc_id: &str) -> Result<bool> {
        let deleted = self.conn().execute(
            "DELETE FROM offline_records WHERE collection = ?1 AND doc_id = ?2",
            [collection, doc_id],
        )?;
        Ok(deleted > 0)
    }

    fn clear(&self, table: Table) -> Result<()> {
        self.conn()
            .execute(&format!("DELETE FROM {}", table.table_name()), [])?;
        Ok(())
    }

    fn count(&self, table: Table) -> Result<usize> {
        let count: i64 = self.conn().query_row(
            &format!("SELECT COUNT(*) FROM {}", table.table_name()),
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as usize)
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;

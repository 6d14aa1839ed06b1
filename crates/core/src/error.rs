// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for ld-core operations.

use thiserror::Error;

/// All possible errors that can occur in ld-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("invalid operation: '{0}'\n  hint: valid operations are: create, update, delete")]
    InvalidOperation(String),

    #[error("invalid comparison: '{0}'\n  hint: valid operators are: =, !=, <, <=, >, >=")]
    InvalidComparison(String),

    #[error("missing payload for {0} mutation\n  hint: only delete mutations may omit a payload")]
    MissingPayload(String),

    #[error("retries exhausted for {operation} {collection}/{doc_id} after {attempts} attempts: {last_error}")]
    RetryExhausted {
        operation: String,
        collection: String,
        doc_id: String,
        attempts: u32,
        last_error: String,
    },

    #[error("{0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for ld-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

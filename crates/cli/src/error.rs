// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::remote::RemoteError;

/// All possible errors that can occur in the larder library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("not online\n  hint: check that the remote store is running and remote.url points at it")]
    NotOnline,

    #[error("remote apply failed: {0}")]
    RemoteApplyFailed(#[from] RemoteError),

    #[error("retries exhausted: {0}")]
    RetryExhausted(String),

    #[error("invalid duration: {reason}")]
    InvalidDuration { reason: String },

    #[error("invalid filter: {reason}\n  hint: filters look like 'amount >= 10' or 'vendor.name = \"Shop\"'")]
    InvalidFilter { reason: String },

    #[error("invalid json payload: {0}")]
    InvalidPayload(String),

    #[error("another larder process is already running for {0}")]
    AlreadyRunning(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("{0}")]
    Core(ld_core::Error),
}

/// A specialized Result type for larder operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<ld_core::Error> for Error {
    fn from(e: ld_core::Error) -> Self {
        match e {
            ld_core::Error::StorageUnavailable(s) => Error::StorageUnavailable(s),
            ld_core::Error::RetryExhausted { .. } => Error::RetryExhausted(e.to_string()),
            ld_core::Error::InvalidInput(s) => Error::InvalidInput(s),
            ld_core::Error::Io(e) => Error::Io(e),
            ld_core::Error::Json(e) => Error::Json(e),
            ld_core::Error::CorruptedData(s) => Error::CorruptedData(s),
            other => Error::Core(other),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

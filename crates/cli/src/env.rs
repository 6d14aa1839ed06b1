// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables read by larder are defined here with
//! typed accessor functions.

use std::path::PathBuf;

/// Environment variable names.
pub mod vars {
    pub const LARDER_REMOTE_URL: &str = "LARDER_REMOTE_URL";
    pub const LARDER_DB: &str = "LARDER_DB";
}

/// Returns `LARDER_REMOTE_URL` if set and non-empty.
pub fn remote_url() -> Option<String> {
    std::env::var(vars::LARDER_REMOTE_URL)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Returns `LARDER_DB` if set and non-empty.
pub fn db_path() -> Option<PathBuf> {
    std::env::var(vars::LARDER_DB)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Nothing listens on the discard port, so the remote store is unreachable.
pub const UNREACHABLE_URL: &str = "ws://127.0.0.1:9";

/// `larder` isolated in `temp`: its own database, no user config.
pub fn larder(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("larder");
    cmd.current_dir(temp.path())
        .env("LARDER_DB", temp.path().join("larder.db"))
        .env("LARDER_REMOTE_URL", UNREACHABLE_URL)
        .env("XDG_CONFIG_HOME", temp.path())
        .env_remove("RUST_LOG");
    cmd
}

pub fn temp() -> TempDir {
    TempDir::new().unwrap()
}

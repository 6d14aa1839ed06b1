// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};

use super::Context;

/// Runs the scheduler and connectivity probe until Ctrl-C.
///
/// One process per database: a second `run` against the same store fails
/// with [`Error::AlreadyRunning`].
pub async fn run(config: Config) -> Result<()> {
    let lock_path = lock_path(&config.db_path());
    let _lock = acquire_lock(&lock_path)?;

    let ctx = Context::open(config);
    info!(
        remote = %ctx.config.remote.url,
        db = %ctx.db_path.display(),
        "larder sync running"
    );

    let handle = ctx.engine.start();
    let probe = ctx.probe();
    let probe_cancel = probe.cancel_token();
    let probe_task = probe.spawn();

    tokio::signal::ctrl_c().await?;
    info!("interrupted, shutting down");

    probe_cancel.cancel();
    join_probe(probe_task).await;
    handle.shutdown().await;
    Ok(())
}

/// Waits for the probe task. Returns false if it panicked or was aborted.
pub(crate) async fn join_probe(task: JoinHandle<()>) -> bool {
    match task.await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "connectivity probe task failed");
            false
        }
    }
}

pub(crate) fn lock_path(db_path: &Path) -> PathBuf {
    db_path.with_extension("lock")
}

/// Takes an exclusive lock on `path`, held until the file is dropped.
pub(crate) fn acquire_lock(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    file.try_lock_exclusive()
        .map_err(|_| Error::AlreadyRunning(path.display().to_string()))?;
    Ok(file)
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

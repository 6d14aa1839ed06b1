// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::connectivity::Connectivity;
use crate::engine::{SyncReport, SyncStatus};
use crate::error::{Error, Result};

use super::{print_json, Context};

#[derive(Serialize)]
struct StatusOutput<'a> {
    remote_url: &'a str,
    db_path: &'a Path,
    #[serde(flatten)]
    status: SyncStatus,
}

/// Probes the remote store once, then prints the engine's status.
pub async fn status(ctx: &Context, format: OutputFormat) -> Result<()> {
    ctx.check_connectivity().await;
    let status = ctx.engine.get_sync_status();
    match format {
        OutputFormat::Json => print_json(&StatusOutput {
            remote_url: &ctx.config.remote.url,
            db_path: &ctx.db_path,
            status,
        }),
        OutputFormat::Text => {
            print!("{}", format_status(ctx, &status));
            Ok(())
        }
    }
}

/// Runs one sync pass if the remote store answers.
pub async fn sync(ctx: &Context, format: OutputFormat) -> Result<()> {
    if !ctx.check_connectivity().await {
        return Err(Error::NotOnline);
    }
    let report = run_pass(ctx).await?;
    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            print!("{}", format_report(&report));
            Ok(())
        }
    }
}

pub(crate) async fn run_pass(ctx: &Context) -> Result<SyncReport> {
    // Nothing else runs passes in this process, so a missing report means
    // connectivity dropped between the probe and the pass.
    ctx.engine.trigger_sync().await.ok_or(Error::NotOnline)
}

pub(crate) fn format_status(ctx: &Context, status: &SyncStatus) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "remote:   {} ({})\n",
        ctx.config.remote.url,
        Connectivity::from_online(status.is_online)
    ));
    let store = if status.persistent {
        ctx.db_path.display().to_string()
    } else {
        "in memory (local store unavailable)".to_string()
    };
    out.push_str(&format!("store:    {store}\n"));
    out.push_str(&format!("queue:    {} pending\n", status.queue_size));
    out.push_str(&format!(
        "offline:  {} records ({} unsynced)\n",
        status.offline_data_size, status.unsynced_records
    ));
    match status.last_sync_at {
        Some(at) => out.push_str(&format!("synced:   {}\n", at.format("%Y-%m-%d %H:%M:%S UTC"))),
        None => out.push_str("synced:   never\n"),
    }
    if status.exhausted_total > 0 {
        out.push_str(&format!("dropped:  {} mutations\n", status.exhausted_total));
    }
    out
}

pub(crate) fn format_report(report: &SyncReport) -> String {
    let drained = &report.drained;
    let mut out = format!(
        "applied {} queued mutation(s), {} failed, {} dropped, {} deferred\n",
        drained.succeeded.len(),
        drained.failed.len(),
        drained.exhausted.len(),
        drained.deferred.len()
    );
    out.push_str(&format!(
        "pushed {} offline record(s), {} failed\n",
        report.records_synced, report.records_failed
    ));
    if report.cache_evicted > 0 {
        out.push_str(&format!(
            "evicted {} expired cache entr{}\n",
            report.cache_evicted,
            if report.cache_evicted == 1 { "y" } else { "ies" }
        ));
    }
    for item in drained.failed.iter().chain(&drained.exhausted) {
        if let Some(error) = &item.last_error {
            out.push_str(&format!(
                "  {} {}/{}: {}\n",
                item.operation(),
                item.collection,
                item.doc_id,
                error
            ));
        }
    }
    out
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;

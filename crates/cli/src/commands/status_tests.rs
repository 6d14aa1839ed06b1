// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::commands::testing::TestContext;
use ld_core::Mutation;
use serde_json::json;

#[tokio::test]
async fn sync_fails_when_remote_unreachable() {
    let t = TestContext::new();
    t.remote.set_unreachable(true);
    t.ctx.engine.enqueue(Mutation::Delete, "items", "i1");

    let err = sync(&t.ctx, OutputFormat::Text).await.unwrap_err();
    assert!(matches!(err, Error::NotOnline));
    assert_eq!(t.ctx.engine.get_sync_status().queue_size, 1);
}

#[tokio::test]
async fn sync_drains_queue_when_reachable() {
    let t = TestContext::new();
    t.ctx
        .engine
        .enqueue(Mutation::Create(json!({"n": 1})), "items", "i1");

    sync(&t.ctx, OutputFormat::Json).await.unwrap();
    assert_eq!(t.ctx.engine.get_sync_status().queue_size, 0);
    assert_eq!(t.remote.document("items", "i1"), Some(json!({"n": 1})));
}

#[tokio::test]
async fn status_probes_before_reporting() {
    let t = TestContext::new();
    status(&t.ctx, OutputFormat::Text).await.unwrap();
    assert!(t.ctx.engine.is_online());
}

#[test]
fn format_status_summarizes_engine() {
    let t = TestContext::new();
    t.ctx.engine.store_offline_data("notes", "n1", json!({}));
    t.ctx.engine.enqueue(Mutation::Delete, "items", "i1");

    let text = format_status(&t.ctx, &t.ctx.engine.get_sync_status());
    assert!(text.contains("remote:   ws://localhost:7891 (offline)"), "{text}");
    assert!(text.contains("in memory"), "{text}");
    assert!(text.contains("queue:    1 pending"), "{text}");
    assert!(text.contains("offline:  1 records (1 unsynced)"), "{text}");
    assert!(text.contains("synced:   never"), "{text}");
    assert!(!text.contains("dropped"), "{text}");
}

#[tokio::test]
async fn format_status_shows_last_sync_time() {
    let t = TestContext::new();
    t.ctx.engine.monitor().set_online(true);
    run_pass(&t.ctx).await.unwrap();

    let text = format_status(&t.ctx, &t.ctx.engine.get_sync_status());
    assert!(text.contains("synced:   2026-01-01 12:00:00 UTC"), "{text}");
}

#[tokio::test]
async fn format_report_lists_failures() {
    let t = TestContext::new();
    t.remote.fail_doc("bad");
    t.ctx.engine.monitor().set_online(true);
    t.ctx
        .engine
        .enqueue(Mutation::Create(json!({})), "items", "bad");
    t.ctx
        .engine
        .enqueue(Mutation::Create(json!({})), "items", "good");

    let report = run_pass(&t.ctx).await.unwrap();
    let text = format_report(&report);
    assert!(
        text.starts_with("applied 1 queued mutation(s), 1 failed, 0 dropped, 0 deferred"),
        "{text}"
    );
    assert!(text.contains("  create items/bad: "), "{text}");
}

#[tokio::test]
async fn run_pass_while_offline_is_not_online() {
    let t = TestContext::new();
    assert!(matches!(run_pass(&t.ctx).await, Err(Error::NotOnline)));
}

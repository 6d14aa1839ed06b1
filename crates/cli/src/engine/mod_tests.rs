// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_helpers::{test_clock, test_config, test_engine, RecordingRemote, RemoteCall};
use ld_core::{Clause, CompareOp};
use serde_json::json;

#[test]
fn config_defaults() {
    let config = EngineConfig::default();
    assert_eq!(config.default_ttl, chrono::Duration::hours(24));
    assert_eq!(config.sync_interval, Duration::from_secs(30));
    assert_eq!(config.max_retries, 3);
    assert!(config.sync_on_enqueue);
    assert_eq!(config.remote_timeout, Duration::from_secs(5));
}

#[test]
fn new_engine_starts_offline_and_idle() {
    let remote = RecordingRemote::new();
    let engine = test_engine(&remote, &test_clock(), test_config(), false);

    let status = engine.get_sync_status();
    assert!(!status.is_online);
    assert!(!status.sync_in_progress);
    assert_eq!(status.queue_size, 0);
    assert_eq!(status.offline_data_size, 0);
    assert_eq!(status.last_sync_at, None);
    assert!(!status.persistent);
    assert_eq!(status.exhausted_total, 0);
    assert!(status.last_report.is_none());
}

#[test]
fn cache_respects_ttl() {
    let remote = RecordingRemote::new();
    let clock = test_clock();
    let engine = test_engine(&remote, &clock, test_config(), false);

    assert!(engine.cache_data("k", json!(1), Some(chrono::Duration::seconds(10))));
    clock.advance(chrono::Duration::seconds(10));
    assert_eq!(engine.get_cached_data("k"), Some(json!(1)));
    clock.advance(chrono::Duration::seconds(1));
    assert_eq!(engine.get_cached_data("k"), None);
}

#[test]
fn cache_uses_configured_default_ttl() {
    let remote = RecordingRemote::new();
    let clock = test_clock();
    let config = EngineConfig {
        default_ttl: chrono::Duration::minutes(5),
        ..test_config()
    };
    let engine = test_engine(&remote, &clock, config, false);

    engine.cache_data("k", json!("v"), None);
    clock.advance(chrono::Duration::minutes(5) + chrono::Duration::seconds(1));
    assert_eq!(engine.get_cached_data("k"), None);
}

#[test]
fn clear_expired_cache_counts_removed_entries() {
    let remote = RecordingRemote::new();
    let clock = test_clock();
    let engine = test_engine(&remote, &clock, test_config(), false);

    engine.cache_data("short", json!(1), Some(chrono::Duration::seconds(1)));
    engine.cache_data("long", json!(2), Some(chrono::Duration::hours(1)));
    clock.advance(chrono::Duration::seconds(2));

    assert_eq!(engine.clear_expired_cache(), 1);
    assert_eq!(engine.get_cached_data("long"), Some(json!(2)));
}

#[test]
fn offline_data_round_trip() {
    let remote = RecordingRemote::new();
    let engine = test_engine(&remote, &test_clock(), test_config(), false);

    assert!(!engine.is_data_available_offline("items"));
    assert!(engine.store_offline_data("items", "b", json!({"n": 2})));
    assert!(engine.store_offline_data("items", "a", json!({"n": 1})));

    assert_eq!(engine.get_offline_data("items", "a"), Some(json!({"n": 1})));
    assert_eq!(engine.get_offline_data("items", "zzz"), None);
    assert!(engine.is_data_available_offline("items"));

    let ids: Vec<String> = engine
        .get_all_offline_data("items")
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids, vec!["a", "b"]);

    let status = engine.get_sync_status();
    assert_eq!(status.offline_data_size, 2);
    assert_eq!(status.unsynced_records, 2);
}

#[test]
fn enqueue_while_offline_only_queues() {
    let remote = RecordingRemote::new();
    let engine = test_engine(&remote, &test_clock(), EngineConfig::default(), false);

    let item = engine
        .enqueue(Mutation::Create(json!({"a": 1})), "items", "i1")
        .unwrap();
    assert_eq!(item.retry_count, 0);
    assert_eq!(engine.queued_mutations(), vec![item]);
    assert_eq!(engine.get_sync_status().queue_size, 1);
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn download_while_offline_is_rejected() {
    let remote = RecordingRemote::new();
    let engine = test_engine(&remote, &test_clock(), test_config(), false);

    let err = engine
        .download_for_offline("items", &Filter::all())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotOnline));
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn downloaded_data_stays_readable_offline() {
    let remote = RecordingRemote::new();
    for (id, n) in [("i1", 1), ("i2", 2), ("i3", 3)] {
        remote.seed("items", id, json!({"n": n}));
    }
    let engine = test_engine(&remote, &test_clock(), test_config(), true);

    let docs = engine
        .download_for_offline("items", &Filter::all())
        .await
        .unwrap();
    assert_eq!(docs.len(), 3);

    engine.monitor().set_online(false);

    assert!(engine.is_data_available_offline("items"));
    let offline = engine.get_all_offline_data("items");
    assert_eq!(offline, docs);
    assert_eq!(engine.get_sync_status().unsynced_records, 0);
    assert_eq!(
        engine.get_cached_data("offline_items"),
        Some(serde_json::to_value(&docs).unwrap())
    );
}

#[tokio::test]
async fn download_applies_filter() {
    let remote = RecordingRemote::new();
    remote.seed("expenses", "e1", json!({"amount": 5}));
    remote.seed("expenses", "e2", json!({"amount": 50}));
    let engine = test_engine(&remote, &test_clock(), test_config(), true);

    let filter = Filter::all().with(Clause::new("amount", CompareOp::Ge, json!(10)));
    let docs = engine.download_for_offline("expenses", &filter).await.unwrap();

    assert_eq!(docs, vec![Document::new("e2", json!({"amount": 50}))]);
    assert_eq!(engine.get_offline_data("expenses", "e1"), None);
}

#[tokio::test]
async fn failed_download_stores_nothing() {
    let remote = RecordingRemote::new();
    remote.seed("items", "i1", json!({}));
    remote.set_failing(true);
    let engine = test_engine(&remote, &test_clock(), test_config(), true);

    let err = engine
        .download_for_offline("items", &Filter::all())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RemoteApplyFailed(_)));
    assert!(!engine.is_data_available_offline("items"));
    assert_eq!(engine.get_cached_data("offline_items"), None);
    assert_eq!(
        remote.calls(),
        vec![RemoteCall::Query {
            collection: "items".into()
        }]
    );
}

#[test]
fn clear_all_empties_records_and_queue() {
    let remote = RecordingRemote::new();
    let engine = test_engine(&remote, &test_clock(), test_config(), false);

    engine.store_offline_data("items", "i1", json!({}));
    engine.store_offline_data("notes", "n1", json!({}));
    engine.enqueue(Mutation::Delete, "items", "i0");
    engine.cache_data("k", json!(1), None);

    assert!(engine.clear_all_offline_data());

    let status = engine.get_sync_status();
    assert_eq!(status.queue_size, 0);
    assert_eq!(status.offline_data_size, 0);
    assert!(!engine.is_data_available_offline("items"));
    assert!(!engine.is_data_available_offline("notes"));
    assert_eq!(engine.get_cached_data("k"), Some(json!(1)));
}

#[test]
fn unusable_store_path_falls_back_to_memory() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "not a directory").unwrap();

    let engine = SyncEngine::open(
        &blocker.join("larder.db"),
        RecordingRemote::new(),
        test_config(),
    );

    assert!(!engine.get_sync_status().persistent);
    assert!(engine.store_offline_data("items", "i1", json!({"n": 1})));
    assert_eq!(engine.get_offline_data("items", "i1"), Some(json!({"n": 1})));
}

#[test]
fn sqlite_store_persists_across_engines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("larder.db");

    {
        let engine = SyncEngine::open(&path, RecordingRemote::new(), test_config());
        assert!(engine.get_sync_status().persistent);
        engine.store_offline_data("items", "i1", json!({"n": 1}));
        engine.enqueue(Mutation::Update(json!({"n": 2})), "items", "i1");
    }

    let engine = SyncEngine::open(&path, RecordingRemote::new(), test_config());
    assert_eq!(engine.get_offline_data("items", "i1"), Some(json!({"n": 1})));
    assert_eq!(engine.get_sync_status().queue_size, 1);
}

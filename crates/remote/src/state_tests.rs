// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use ld_core::{Clause, CompareOp};
use serde_json::json;
use tempfile::TempDir;

#[tokio::test]
async fn put_overwrites() {
    let dir = TempDir::new().unwrap();
    let state = ServerState::open(dir.path()).unwrap();

    state.put("items", "i1", json!({"a": 1, "b": 1})).await.unwrap();
    state.put("items", "i1", json!({"a": 2})).await.unwrap();
    assert_eq!(state.get("items", "i1").await, Some(json!({"a": 2})));
}

#[tokio::test]
async fn patch_merges_top_level_fields() {
    let dir = TempDir::new().unwrap();
    let state = ServerState::open(dir.path()).unwrap();

    state
        .put("expenses", "e1", json!({"amount": 1, "vendor": {"name": "Shop"}}))
        .await
        .unwrap();
    state
        .patch("expenses", "e1", json!({"amount": 12}))
        .await
        .unwrap();
    assert_eq!(
        state.get("expenses", "e1").await,
        Some(json!({"amount": 12, "vendor": {"name": "Shop"}}))
    );
}

#[tokio::test]
async fn patch_missing_document_fails() {
    let dir = TempDir::new().unwrap();
    let state = ServerState::open(dir.path()).unwrap();

    let err = state
        .patch("expenses", "nope", json!({"amount": 1}))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("document not found"));
    assert_eq!(state.get("expenses", "nope").await, None);
}

#[tokio::test]
async fn patch_requires_object() {
    let dir = TempDir::new().unwrap();
    let state = ServerState::open(dir.path()).unwrap();
    state.put("items", "i1", json!({})).await.unwrap();

    let err = state.patch("items", "i1", json!([1])).await.unwrap_err();
    assert!(err.to_string().contains("JSON object"));
}

#[tokio::test]
async fn delete_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let state = ServerState::open(dir.path()).unwrap();
    state.put("items", "i1", json!({})).await.unwrap();

    state.delete("items", "i1").await.unwrap();
    state.delete("items", "i1").await.unwrap();
    state.delete("ghosts", "g1").await.unwrap();
    assert_eq!(state.get("items", "i1").await, None);
}

#[tokio::test]
async fn query_filters_in_id_order() {
    let dir = TempDir::new().unwrap();
    let state = ServerState::open(dir.path()).unwrap();
    state.put("expenses", "e3", json!({"amount": 30})).await.unwrap();
    state.put("expenses", "e1", json!({"amount": 10})).await.unwrap();
    state.put("expenses", "e2", json!({"amount": 5})).await.unwrap();

    let filter = Filter::all().with(Clause::new("amount", CompareOp::Ge, json!(10)));
    let ids: Vec<String> = state
        .query("expenses", &filter)
        .await
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids, vec!["e1", "e3"]);

    let limited = state.query("expenses", &Filter::all().limit(1)).await;
    assert_eq!(limited.len(), 1);
    assert!(state.query("nothing", &Filter::all()).await.is_empty());
}

#[tokio::test]
async fn state_survives_restart_and_compacts() {
    let dir = TempDir::new().unwrap();
    {
        let state = ServerState::open(dir.path()).unwrap();
        state.put("items", "i1", json!({"n": 1})).await.unwrap();
        state.patch("items", "i1", json!({"m": 2})).await.unwrap();
        state.put("items", "i2", json!({})).await.unwrap();
        state.delete("items", "i2").await.unwrap();
    }

    let state = ServerState::open(dir.path()).unwrap();
    assert_eq!(state.get("items", "i1").await, Some(json!({"n": 1, "m": 2})));
    assert_eq!(state.get("items", "i2").await, None);

    let journal = std::fs::read_to_string(dir.path().join(JOURNAL_NAME)).unwrap();
    assert_eq!(journal.lines().count(), 1);
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod common;
use common::*;

#[test]
fn mutations_list_in_order() {
    let temp = temp();

    larder(&temp)
        .args(["queue", "update", "expenses", "e1", r#"{"amount": 10}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("queued #1 update expenses/e1"));
    larder(&temp)
        .args(["queue", "update", "expenses", "e1", r#"{"amount": 12}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("queued #2 update expenses/e1"));

    let output = larder(&temp)
        .args(["queue", "list", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let items: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let amounts: Vec<_> = items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["payload"]["amount"].clone())
        .collect();
    assert_eq!(amounts, vec![serde_json::json!(10), serde_json::json!(12)]);
}

#[test]
fn update_rejects_non_object() {
    let temp = temp();

    larder(&temp)
        .args(["queue", "update", "expenses", "e1", "12"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid json payload"));
}

#[test]
fn empty_collection_is_rejected() {
    let temp = temp();

    larder(&temp)
        .args(["queue", "delete", "", "e1"])
        .assert()
        .failure();
}

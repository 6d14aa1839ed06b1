// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod common;
use common::*;

#[test]
fn store_survives_across_invocations() {
    let temp = temp();

    larder(&temp)
        .args(["offline", "store", "notes", "n1", r#"{"text": "hi"}"#])
        .assert()
        .success();

    larder(&temp)
        .args(["offline", "get", "notes", "n1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"text":"hi"}"#));

    larder(&temp)
        .args(["offline", "list", "notes", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": \"n1\""));
}

#[test]
fn get_unknown_document() {
    let temp = temp();

    larder(&temp)
        .args(["offline", "get", "notes", "missing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(not available offline)"));
}

#[test]
fn download_while_unreachable_fails() {
    let temp = temp();

    larder(&temp)
        .args(["offline", "download", "expenses"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not online"));
}

#[test]
fn download_with_bad_filter_fails() {
    let temp = temp();

    larder(&temp)
        .args(["offline", "download", "expenses", "-w", "amount"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid filter"));
}

#[test]
fn clear_removes_everything() {
    let temp = temp();

    larder(&temp)
        .args(["offline", "store", "notes", "n1", "{}"])
        .assert()
        .success();
    larder(&temp)
        .args(["queue", "delete", "notes", "n0"])
        .assert()
        .success();

    larder(&temp).args(["offline", "clear"]).assert().success();

    larder(&temp)
        .args(["offline", "get", "notes", "n1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(not available offline)"));
    larder(&temp)
        .args(["queue", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(queue empty)"));
}

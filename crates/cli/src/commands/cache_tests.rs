// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::commands::testing::TestContext;

#[test]
fn put_then_get_returns_compact_json() {
    let t = TestContext::new();
    put(&t.ctx, "rates", r#"{ "eur": 1.08 }"#, None).unwrap();
    assert_eq!(get(&t.ctx, "rates").unwrap().as_deref(), Some(r#"{"eur":1.08}"#));
}

#[test]
fn put_with_ttl_expires() {
    let t = TestContext::new();
    put(&t.ctx, "k", "1", Some("10s")).unwrap();

    t.clock.advance(chrono::Duration::seconds(10));
    assert!(get(&t.ctx, "k").unwrap().is_some());
    t.clock.advance(chrono::Duration::seconds(1));
    assert!(get(&t.ctx, "k").unwrap().is_none());
}

#[test]
fn put_with_enormous_ttl_is_stored() {
    let t = TestContext::new();
    put(&t.ctx, "k", "1", Some("100000000d")).unwrap();

    t.clock.advance(chrono::Duration::days(365 * 1000));
    assert_eq!(get(&t.ctx, "k").unwrap().as_deref(), Some("1"));
}

#[test]
fn put_rejects_bad_json() {
    let t = TestContext::new();
    let err = put(&t.ctx, "k", "{", None).unwrap_err();
    assert!(matches!(err, Error::InvalidPayload(_)));
    assert!(get(&t.ctx, "k").unwrap().is_none());
}

#[test]
fn put_rejects_bad_ttl() {
    let t = TestContext::new();
    let err = put(&t.ctx, "k", "1", Some("soon")).unwrap_err();
    assert!(matches!(err, Error::InvalidDuration { .. }));
}

#[test]
fn missing_key_is_none() {
    let t = TestContext::new();
    assert!(get(&t.ctx, "nope").unwrap().is_none());
}

#[test]
fn sweep_command_removes_expired() {
    let t = TestContext::new();
    put(&t.ctx, "a", "1", Some("1s")).unwrap();
    put(&t.ctx, "b", "2", Some("1h")).unwrap();
    t.clock.advance(chrono::Duration::seconds(2));

    run(&t.ctx, CacheCommand::Sweep).unwrap();
    assert_eq!(t.ctx.engine.clear_expired_cache(), 0);
    assert!(get(&t.ctx, "b").unwrap().is_some());
}

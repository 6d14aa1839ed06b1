// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::remote::TransportError;
use yare::parameterized;

#[parameterized(
    not_online = { Error::NotOnline, "not online" },
    storage = { Error::StorageUnavailable("/tmp/x.db".into()), "/tmp/x.db" },
    duration = { Error::InvalidDuration { reason: "empty".into() }, "invalid duration" },
    filter = { Error::InvalidFilter { reason: "missing value".into() }, "hint" },
    running = { Error::AlreadyRunning("/tmp/x.db".into()), "already running" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn core_storage_error_maps_to_storage_unavailable() {
    let err: Error = ld_core::Error::StorageUnavailable("gone".into()).into();
    assert!(matches!(err, Error::StorageUnavailable(s) if s == "gone"));
}

#[test]
fn core_io_error_maps_to_io() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: Error = ld_core::Error::Io(io).into();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn other_core_errors_keep_their_message() {
    let err: Error = ld_core::Error::InvalidOperation("upsert".into()).into();
    assert!(matches!(err, Error::Core(_)));
    assert!(err.to_string().contains("upsert"));
}

#[test]
fn remote_errors_are_apply_failures() {
    let err: Error = RemoteError::Transport(TransportError::ConnectionClosed).into();
    assert!(matches!(err, Error::RemoteApplyFailed(_)));
    assert!(err.to_string().contains("connection closed"));
}

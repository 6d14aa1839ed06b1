// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote document store access.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌───────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ SyncEngine  │────►│  RemoteStore  │────►│  Transport  │────►│  ld-remote  │
//! │             │◄────│(WsRemoteStore)│◄────│   (trait)   │◄────│   server    │
//! └─────────────┘     └───────────────┘     └─────────────┘     └─────────────┘
//! ```

mod client;
mod transport;

pub use client::{
    apply_mutation, RemoteError, RemoteFuture, RemoteResult, RemoteSettings, RemoteStore,
    WsRemoteStore,
};
pub use transport::{
    Transport, TransportError, TransportFuture, TransportResult, WebSocketTransport,
};

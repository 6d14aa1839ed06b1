// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! larder - An offline-first cache, offline store and sync queue.
//!
//! This crate provides the engine behind the `larder` CLI: reads are served
//! from a local SQLite store and writes are queued until a remote document
//! store is reachable.
//!
//! # Main Components
//!
//! - [`SyncEngine`] - Cache, offline records, sync queue and sync passes
//! - [`ConnectivityMonitor`] - Online status and sync triggers
//! - [`RemoteStore`] - The remote document store ([`WsRemoteStore`] over WebSocket)
//! - [`Config`] - TOML configuration with environment overrides
//! - [`Error`] - Error types for all operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use larder::{EngineConfig, RemoteSettings, SyncEngine, WsRemoteStore};
//!
//! let remote = Arc::new(WsRemoteStore::new(RemoteSettings::default()));
//! let engine = SyncEngine::open(Path::new("larder.db"), remote, EngineConfig::default());
//! let handle = engine.start();
//!
//! engine.enqueue(Mutation::Update(json!({"amount": 12})), "expenses", "e1");
//! ```

mod cli;
mod commands;
pub mod config;
pub mod connectivity;
pub mod engine;
mod env;
pub mod error;
pub mod filter;
pub mod remote;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use cli::{CacheCommand, Cli, Command, OfflineCommand, OutputFormat, QueueCommand};
pub use config::Config;
pub use connectivity::{Connectivity, ConnectivityMonitor, ConnectivityProbe, SyncTrigger};
pub use engine::{EngineConfig, EngineHandle, SyncEngine, SyncReport, SyncStatus};
pub use error::{Error, Result};
pub use remote::{RemoteError, RemoteSettings, RemoteStore, WsRemoteStore};

/// Execute a CLI invocation. Loads configuration, then runs the command on
/// a fresh tokio runtime.
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::discover(cli.config.as_deref())?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(commands::execute(cli.command, config))
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod cache;
pub mod offline;
pub mod queue;
pub mod run;
pub mod status;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::cli::Command;
use crate::config::Config;
use crate::connectivity::{ConnectivityProbe, ProbeConfig};
use crate::engine::SyncEngine;
use crate::error::{Error, Result};
use crate::remote::{RemoteSettings, RemoteStore, WsRemoteStore};

/// What a command needs: the loaded configuration and an engine over it.
pub struct Context {
    pub config: Config,
    pub db_path: PathBuf,
    pub engine: SyncEngine,
}

impl Context {
    /// Opens the configured store and a lazily connecting remote client.
    pub fn open(config: Config) -> Self {
        let db_path = config.db_path();
        let remote: Arc<dyn RemoteStore> = Arc::new(WsRemoteStore::new(remote_settings(&config)));
        let engine = SyncEngine::open(&db_path, remote, config.engine_config());
        Context {
            config,
            db_path,
            engine,
        }
    }

    /// Probe reporting into this engine's connectivity monitor.
    pub fn probe(&self) -> ConnectivityProbe {
        ConnectivityProbe::new(
            Arc::clone(self.engine.remote()),
            Arc::clone(self.engine.monitor()),
            probe_config(&self.config),
        )
    }

    /// Pings the remote store once, updating the engine's status.
    pub async fn check_connectivity(&self) -> bool {
        self.probe().probe_once().await
    }
}

pub fn remote_settings(config: &Config) -> RemoteSettings {
    RemoteSettings {
        url: config.remote.url.clone(),
        connect_timeout: config.connect_timeout(),
        request_timeout: config.engine_config().remote_timeout,
    }
}

pub fn probe_config(config: &Config) -> ProbeConfig {
    ProbeConfig {
        interval: config.probe_interval(),
        timeout: config.engine_config().remote_timeout,
        ..ProbeConfig::default()
    }
}

/// Runs a parsed command.
pub async fn execute(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Status { output } => status::status(&Context::open(config), output.output).await,
        Command::Sync { output } => status::sync(&Context::open(config), output.output).await,
        Command::Run => run::run(config).await,
        Command::Cache(cmd) => cache::run(&Context::open(config), cmd),
        Command::Offline(cmd) => offline::run(&Context::open(config), cmd).await,
        Command::Queue(cmd) => queue::run(&Context::open(config), cmd),
    }
}

/// Parses a JSON argument.
pub fn parse_payload(input: &str) -> Result<Value> {
    serde_json::from_str(input).map_err(|e| Error::InvalidPayload(e.to_string()))
}

/// Like [`parse_payload`], but the value must be a JSON object.
pub fn parse_object(input: &str) -> Result<Value> {
    let value = parse_payload(input)?;
    if !value.is_object() {
        return Err(Error::InvalidPayload(
            "expected a JSON object of fields".to_string(),
        ));
    }
    Ok(value)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration management.
//!
//! Configuration is read from TOML, looked up in order from `--config`,
//! `./larder.toml`, then `$XDG_CONFIG_HOME/larder/config.toml`. A missing
//! file means defaults. `LARDER_REMOTE_URL` and `LARDER_DB` override the
//! file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::EngineConfig;
use crate::env;
use crate::error::{Error, Result};

const APP_DIR_NAME: &str = "larder";
const LOCAL_CONFIG_FILE_NAME: &str = "larder.toml";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "larder.db";

/// Longest accepted `cache.default_ttl_secs`: 100 years.
pub const MAX_DEFAULT_TTL_SECS: u64 = 100 * 365 * 86_400;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub cache: CacheConfig,
    pub sync: SyncConfig,
    pub remote: RemoteConfig,
}

/// Local store location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file. Defaults to `$XDG_DATA_HOME/larder/larder.db`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL for cache entries written without one (default: 86400).
    pub default_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            default_ttl_secs: 86_400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds between scheduled passes while online (default: 30).
    pub interval_secs: u64,
    /// Failed attempts before a queued mutation is dropped (default: 3).
    pub max_retries: u32,
    /// Request a pass as soon as a mutation is enqueued online (default: true).
    pub on_enqueue: bool,
    /// Timeout for each remote call in milliseconds (default: 5000).
    pub remote_timeout_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            interval_secs: 30,
            max_retries: 3,
            on_enqueue: true,
            remote_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// WebSocket URL of the remote document store.
    pub url: String,
    /// Seconds between connectivity probes (default: 10).
    pub probe_interval_secs: u64,
    /// Max time to wait for a connection in milliseconds (default: 3000).
    pub connect_timeout_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            url: "ws://localhost:7891".to_string(),
            probe_interval_secs: 10,
            connect_timeout_ms: 3_000,
        }
    }
}

impl Config {
    /// Loads and validates configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            Error::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Finds and loads the configuration, then applies environment overrides.
    ///
    /// An explicit path must exist; the fallback locations are optional.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Config::load(path)?,
            None => match search_paths().into_iter().find(|p| p.is_file()) {
                Some(path) => Config::load(&path)?,
                None => Config::default(),
            },
        };
        config.apply_overrides(env::remote_url(), env::db_path());
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides that take precedence over the file.
    pub fn apply_overrides(&mut self, remote_url: Option<String>, db_path: Option<PathBuf>) {
        if let Some(url) = remote_url {
            self.remote.url = url;
        }
        if let Some(path) = db_path {
            self.store.path = Some(path);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sync.max_retries < 1 {
            return Err(Error::Config("sync.max_retries must be at least 1".into()));
        }
        if self.sync.interval_secs < 1 {
            return Err(Error::Config("sync.interval_secs must be at least 1".into()));
        }
        if self.cache.default_ttl_secs > MAX_DEFAULT_TTL_SECS {
            return Err(Error::Config(format!(
                "cache.default_ttl_secs must be at most {MAX_DEFAULT_TTL_SECS} (100 years)"
            )));
        }
        if !(self.remote.url.starts_with("ws://") || self.remote.url.starts_with("wss://")) {
            return Err(Error::Config(format!(
                "invalid remote URL '{}': must start with ws:// or wss://",
                self.remote.url
            )));
        }
        Ok(())
    }

    /// Database file location.
    pub fn db_path(&self) -> PathBuf {
        match &self.store.path {
            Some(path) => path.clone(),
            None => dirs::data_dir()
                .map(|d| d.join(APP_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from("."))
                .join(DB_FILE_NAME),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            default_ttl: i64::try_from(self.cache.default_ttl_secs.min(MAX_DEFAULT_TTL_SECS))
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .unwrap_or(chrono::Duration::MAX),
            sync_interval: Duration::from_secs(self.sync.interval_secs),
            max_retries: self.sync.max_retries,
            sync_on_enqueue: self.sync.on_enqueue,
            remote_timeout: Duration::from_millis(self.sync.remote_timeout_ms),
        }
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.remote.probe_interval_secs.max(1))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.remote.connect_timeout_ms)
    }
}

/// Fallback config locations, most specific first.
fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    paths
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity tracking and sync triggers.
//!
//! The [`ConnectivityMonitor`] holds the published online/offline status and
//! turns host events into [`SyncTrigger`]s for the scheduler. Hosts without a
//! platform signal run a [`ConnectivityProbe`], which pings the remote store
//! and reports the result to the monitor.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::remote::RemoteStore;

/// Pending triggers beyond this are dropped; passes coalesce anyway.
const TRIGGER_CAPACITY: usize = 16;

/// Published connectivity status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    Online,
    Offline,
}

impl Connectivity {
    pub fn from_online(online: bool) -> Self {
        if online {
            Connectivity::Online
        } else {
            Connectivity::Offline
        }
    }

    pub fn is_online(self) -> bool {
        self == Connectivity::Online
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connectivity::Online => write!(f, "online"),
            Connectivity::Offline => write!(f, "offline"),
        }
    }
}

/// Why a sync pass was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    /// Connectivity came back.
    Reconnect,
    /// The host regained foreground focus while online.
    Focus,
    /// A mutation was enqueued while online.
    Enqueue,
}

/// Tracks whether the remote store is reachable.
pub struct ConnectivityMonitor {
    online: AtomicBool,
    status_tx: watch::Sender<Connectivity>,
    trigger_tx: mpsc::Sender<SyncTrigger>,
}

impl ConnectivityMonitor {
    /// Creates a monitor and the receiving end of its trigger channel.
    pub fn new(initial: Connectivity) -> (Self, mpsc::Receiver<SyncTrigger>) {
        let (trigger_tx, trigger_rx) = mpsc::channel(TRIGGER_CAPACITY);
        let (status_tx, _) = watch::channel(initial);
        let monitor = ConnectivityMonitor {
            online: AtomicBool::new(initial.is_online()),
            status_tx,
            trigger_tx,
        };
        (monitor, trigger_rx)
    }

    /// Records the current reachability. Returns true if the status changed.
    ///
    /// Going from offline to online emits a [`SyncTrigger::Reconnect`].
    pub fn set_online(&self, online: bool) -> bool {
        let was_online = self.online.swap(online, Ordering::AcqRel);
        if was_online == online {
            return false;
        }

        let status = Connectivity::from_online(online);
        self.status_tx.send_replace(status);
        info!(%status, "connectivity changed");
        if online {
            self.request(SyncTrigger::Reconnect);
        }
        true
    }

    /// The host regained focus; requests a pass while online.
    pub fn notify_focus(&self) {
        if self.is_online() {
            self.request(SyncTrigger::Focus);
        }
    }

    /// Queues a trigger for the scheduler, dropping it if the queue is full.
    pub fn request(&self, trigger: SyncTrigger) {
        if let Err(e) = self.trigger_tx.try_send(trigger) {
            debug!(?trigger, error = %e, "sync trigger dropped");
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    pub fn status(&self) -> Connectivity {
        Connectivity::from_online(self.is_online())
    }

    /// Watches status changes.
    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.status_tx.subscribe()
    }
}

/// Configuration for the connectivity probe.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Time between probes while online.
    pub interval: Duration,
    /// Upper bound for a single ping.
    pub timeout: Duration,
    /// First delay after going offline; doubles up to `interval`.
    pub initial_backoff: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(3),
            initial_backoff: Duration::from_millis(500),
        }
    }
}

/// Background task that pings the remote store and updates the monitor.
pub struct ConnectivityProbe {
    remote: Arc<dyn RemoteStore>,
    monitor: Arc<ConnectivityMonitor>,
    config: ProbeConfig,
    cancel_token: CancellationToken,
}

impl ConnectivityProbe {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        monitor: Arc<ConnectivityMonitor>,
        config: ProbeConfig,
    ) -> Self {
        ConnectivityProbe {
            remote,
            monitor,
            config,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Token that stops the probe loop when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Pings once and reports the result. Returns whether the store answered.
    pub async fn probe_once(&self) -> bool {
        let reachable = match tokio::time::timeout(self.config.timeout, self.remote.ping()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                debug!(error = %e, "probe failed");
                false
            }
            Err(_) => {
                debug!(timeout = ?self.config.timeout, "probe timed out");
                false
            }
        };
        self.monitor.set_online(reachable);
        reachable
    }

    /// Runs the probe loop on the current runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Probes until cancelled, backing off exponentially while offline.
    pub async fn run(self) {
        let mut backoff = self.config.initial_backoff;

        loop {
            if self.cancel_token.is_cancelled() {
                return;
            }

            let delay = if self.probe_once().await {
                backoff = self.config.initial_backoff;
                self.config.interval
            } else {
                let delay = backoff;
                backoff = std::cmp::min(backoff.saturating_mul(2), self.config.interval);
                delay
            };

            tokio::select! {
                _ = self.cancel_token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;

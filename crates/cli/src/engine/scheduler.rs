// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background scheduling of sync passes.
//!
//! One task waits on the interval timer and the monitor's trigger channel
//! and runs a pass for each. Passes are awaited inline, so the task itself
//! is the single logical worker. Triggers that pile up during a pass are
//! folded into one follow-up pass.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{lock, SyncEngine};
use crate::connectivity::SyncTrigger;

/// Handle to a running scheduler.
pub struct EngineHandle {
    cancel_token: CancellationToken,
    task: JoinHandle<()>,
}

impl EngineHandle {
    /// Token that stops the scheduler when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Stops the scheduler, letting an in-flight pass finish first.
    pub async fn shutdown(self) {
        self.cancel_token.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "scheduler task failed");
        }
    }
}

impl SyncEngine {
    /// Spawns the scheduler on the current tokio runtime.
    pub fn start(&self) -> EngineHandle {
        let cancel_token = CancellationToken::new();
        let engine = self.clone();
        let token = cancel_token.clone();
        let task = tokio::spawn(async move {
            let triggers = lock(&engine.inner.triggers).take();
            if triggers.is_none() {
                warn!("another scheduler owns the trigger channel, running on the timer only");
            }
            let triggers = engine.run_scheduler(triggers, token).await;
            if triggers.is_some() {
                *lock(&engine.inner.triggers) = triggers;
            }
        });
        EngineHandle { cancel_token, task }
    }

    /// Returns the trigger receiver once cancelled so a later start can reuse it.
    async fn run_scheduler(
        &self,
        mut triggers: Option<mpsc::Receiver<SyncTrigger>>,
        cancel_token: CancellationToken,
    ) -> Option<mpsc::Receiver<SyncTrigger>> {
        // A zero period would make interval_at panic.
        let period = self.inner.config.sync_interval.max(Duration::from_millis(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval = ?period, "sync scheduler started");

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                trigger = next_trigger(&mut triggers) => {
                    match trigger {
                        Some(trigger) => {
                            debug!(?trigger, "sync triggered");
                            self.sync_coalesced(&mut triggers).await;
                        }
                        None => triggers = None,
                    }
                }
                _ = ticker.tick() => {
                    if self.is_online() {
                        self.sync_coalesced(&mut triggers).await;
                    }
                }
            }
        }

        info!("sync scheduler stopped");
        triggers
    }

    /// Runs a pass, then one more while triggers keep arriving mid-pass.
    async fn sync_coalesced(&self, triggers: &mut Option<mpsc::Receiver<SyncTrigger>>) {
        loop {
            self.trigger_sync().await;
            let pending = drain_pending(triggers);
            if pending == 0 {
                break;
            }
            debug!(pending, "triggers arrived during pass, running once more");
        }
    }
}

/// Discards queued triggers and returns how many there were.
fn drain_pending(triggers: &mut Option<mpsc::Receiver<SyncTrigger>>) -> usize {
    let Some(rx) = triggers else {
        return 0;
    };
    let mut drained = 0;
    while rx.try_recv().is_ok() {
        drained += 1;
    }
    drained
}

async fn next_trigger(triggers: &mut Option<mpsc::Receiver<SyncTrigger>>) -> Option<SyncTrigger> {
    match triggers {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;

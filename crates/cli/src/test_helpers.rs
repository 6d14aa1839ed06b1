// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test doubles for larder unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use ld_core::{Document, Filter, ManualClock, MemoryStore};
use serde_json::Value;
use tokio::sync::{Notify, Semaphore};

use crate::engine::{EngineConfig, SyncEngine};
use crate::remote::{RemoteError, RemoteFuture, RemoteResult, RemoteStore};

/// A call observed by [`RecordingRemote`].
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    Create {
        collection: String,
        doc_id: String,
        payload: Value,
    },
    Update {
        collection: String,
        doc_id: String,
        payload: Value,
    },
    Delete {
        collection: String,
        doc_id: String,
    },
    Query {
        collection: String,
    },
}

/// In-memory remote store that records every call.
///
/// Calls can be made to fail, globally or per document, and can be held at
/// a gate to observe overlapping passes.
pub struct RecordingRemote {
    calls: Mutex<Vec<RemoteCall>>,
    documents: Mutex<BTreeMap<(String, String), Value>>,
    failing: AtomicBool,
    failing_docs: Mutex<HashSet<String>>,
    unreachable: AtomicBool,
    held: AtomicBool,
    gate: Semaphore,
    entered: Notify,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingRemote {
            calls: Mutex::new(Vec::new()),
            documents: Mutex::new(BTreeMap::new()),
            failing: AtomicBool::new(false),
            failing_docs: Mutex::new(HashSet::new()),
            unreachable: AtomicBool::new(false),
            held: AtomicBool::new(false),
            gate: Semaphore::new(0),
            entered: Notify::new(),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    /// Makes every write and query fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Makes writes to `doc_id` fail.
    pub fn fail_doc(&self, doc_id: &str) {
        self.failing_docs.lock().unwrap().insert(doc_id.to_string());
    }

    /// Makes pings fail.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Blocks calls until released.
    pub fn hold(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    /// Lets `n` held calls through.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Waits until some call has entered the store.
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub fn seed(&self, collection: &str, doc_id: &str, payload: Value) {
        self.documents
            .lock()
            .unwrap()
            .insert((collection.to_string(), doc_id.to_string()), payload);
    }

    pub fn document(&self, collection: &str, doc_id: &str) -> Option<Value> {
        self.documents
            .lock()
            .unwrap()
            .get(&(collection.to_string(), doc_id.to_string()))
            .cloned()
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self, call: RemoteCall, doc_id: Option<&str>) -> RemoteResult<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.entered.notify_one();

        if self.held.load(Ordering::SeqCst) {
            if let Ok(permit) = self.gate.acquire().await {
                permit.forget();
            }
        }

        self.calls.lock().unwrap().push(call);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let doc_failing =
            doc_id.is_some_and(|id| self.failing_docs.lock().unwrap().contains(id));
        if self.failing.load(Ordering::SeqCst) || doc_failing {
            return Err(RemoteError::Rejected("remote unavailable".into()));
        }
        Ok(())
    }
}

impl RemoteStore for RecordingRemote {
    fn create<'a>(
        &'a self,
        collection: &'a str,
        doc_id: &'a str,
        payload: &'a Value,
    ) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            let call = RemoteCall::Create {
                collection: collection.into(),
                doc_id: doc_id.into(),
                payload: payload.clone(),
            };
            self.enter(call, Some(doc_id)).await?;
            self.seed(collection, doc_id, payload.clone());
            Ok(())
        })
    }

    fn update<'a>(
        &'a self,
        collection: &'a str,
        doc_id: &'a str,
        payload: &'a Value,
    ) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            let call = RemoteCall::Update {
                collection: collection.into(),
                doc_id: doc_id.into(),
                payload: payload.clone(),
            };
            self.enter(call, Some(doc_id)).await?;
            let mut documents = self.documents.lock().unwrap();
            let key = (collection.to_string(), doc_id.to_string());
            let Some(existing) = documents.get_mut(&key) else {
                return Err(RemoteError::Rejected("document not found".into()));
            };
            if let (Some(target), Some(fields)) = (existing.as_object_mut(), payload.as_object()) {
                for (k, v) in fields {
                    target.insert(k.clone(), v.clone());
                }
            }
            Ok(())
        })
    }

    fn delete<'a>(&'a self, collection: &'a str, doc_id: &'a str) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            let call = RemoteCall::Delete {
                collection: collection.into(),
                doc_id: doc_id.into(),
            };
            self.enter(call, Some(doc_id)).await?;
            self.documents
                .lock()
                .unwrap()
                .remove(&(collection.to_string(), doc_id.to_string()));
            Ok(())
        })
    }

    fn query<'a>(
        &'a self,
        collection: &'a str,
        filter: &'a Filter,
    ) -> RemoteFuture<'a, Vec<Document>> {
        Box::pin(async move {
            let call = RemoteCall::Query {
                collection: collection.into(),
            };
            self.enter(call, None).await?;
            let docs: Vec<Document> = self
                .documents
                .lock()
                .unwrap()
                .iter()
                .filter(|((c, _), _)| c == collection)
                .map(|((_, id), payload)| Document::new(id.clone(), payload.clone()))
                .collect();
            Ok(filter.apply(docs.iter()))
        })
    }

    fn ping(&self) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            if self.unreachable.load(Ordering::SeqCst) {
                Err(RemoteError::Rejected("unreachable".into()))
            } else {
                Ok(())
            }
        })
    }
}

/// Clock fixed at a known instant.
pub fn test_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
    ))
}

/// Engine config for tests: no enqueue trigger, short timeouts.
pub fn test_config() -> EngineConfig {
    EngineConfig {
        sync_on_enqueue: false,
        remote_timeout: Duration::from_secs(2),
        ..EngineConfig::default()
    }
}

/// In-memory engine over `remote`, online or not.
pub fn test_engine(
    remote: &Arc<RecordingRemote>,
    clock: &Arc<ManualClock>,
    config: EngineConfig,
    online: bool,
) -> SyncEngine {
    let engine = SyncEngine::new(
        Arc::new(MemoryStore::new()),
        Arc::clone(remote) as Arc<dyn RemoteStore>,
        Arc::clone(clock) as Arc<dyn ld_core::Clock>,
        config,
    );
    engine.monitor().set_online(online);
    engine
}

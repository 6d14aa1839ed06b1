// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Server state management.
//!
//! Holds every collection in memory and journals each change to
//! `documents.jsonl` before acknowledging it.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::info;

use ld_core::{Document, Error, Filter, Journal, Result};

/// Journal filename within the data directory.
pub const JOURNAL_NAME: &str = "documents.jsonl";

type Collections = BTreeMap<String, BTreeMap<String, Value>>;

/// One change to the document set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
enum Change {
    Put {
        collection: String,
        doc_id: String,
        payload: Value,
    },
    Delete {
        collection: String,
        doc_id: String,
    },
}

impl Change {
    fn apply(self, collections: &mut Collections) {
        match self {
            Change::Put {
                collection,
                doc_id,
                payload,
            } => {
                collections
                    .entry(collection)
                    .or_default()
                    .insert(doc_id, payload);
            }
            Change::Delete { collection, doc_id } => {
                if let Some(docs) = collections.get_mut(&collection) {
                    docs.remove(&doc_id);
                    if docs.is_empty() {
                        collections.remove(&collection);
                    }
                }
            }
        }
    }
}

/// Shared server state containing the document set and its journal.
#[derive(Clone)]
pub struct ServerState {
    inner: Arc<Mutex<Documents>>,
}

struct Documents {
    collections: Collections,
    journal: Journal,
}

impl Documents {
    /// Journals `change`, then applies it.
    fn commit(&mut self, change: Change) -> Result<()> {
        self.journal.append(&change)?;
        change.apply(&mut self.collections);
        Ok(())
    }
}

impl ServerState {
    /// Loads the journal in `data_dir`, then compacts it to one entry per
    /// live document.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(JOURNAL_NAME);
        let changes: Vec<Change> = Journal::replay(&path)?;
        let replayed = changes.len();

        let mut collections = Collections::new();
        for change in changes {
            change.apply(&mut collections);
        }

        let mut journal = Journal::open(&path)?;
        let live: Vec<Change> = collections
            .iter()
            .flat_map(|(collection, docs)| {
                docs.iter().map(move |(doc_id, payload)| Change::Put {
                    collection: collection.clone(),
                    doc_id: doc_id.clone(),
                    payload: payload.clone(),
                })
            })
            .collect();
        journal.compact(&live)?;
        info!(
            "Loaded {} documents from {} journal entries",
            live.len(),
            replayed
        );

        Ok(ServerState {
            inner: Arc::new(Mutex::new(Documents {
                collections,
                journal,
            })),
        })
    }

    /// Writes a whole document, replacing any existing one.
    pub async fn put(&self, collection: &str, doc_id: &str, payload: Value) -> Result<()> {
        let mut docs = self.inner.lock().await;
        docs.commit(Change::Put {
            collection: collection.to_string(),
            doc_id: doc_id.to_string(),
            payload,
        })
    }

    /// Merges top-level fields into an existing document.
    pub async fn patch(&self, collection: &str, doc_id: &str, fields: Value) -> Result<()> {
        let Value::Object(fields) = fields else {
            return Err(Error::InvalidInput(
                "patch payload must be a JSON object".to_string(),
            ));
        };

        let mut docs = self.inner.lock().await;
        let existing = docs
            .collections
            .get(collection)
            .and_then(|c| c.get(doc_id))
            .ok_or_else(|| {
                Error::InvalidInput(format!("document not found: {collection}/{doc_id}"))
            })?;

        let mut merged = match existing {
            Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        };
        merged.extend(fields);

        docs.commit(Change::Put {
            collection: collection.to_string(),
            doc_id: doc_id.to_string(),
            payload: Value::Object(merged),
        })
    }

    /// Removes a document. Removing a missing document is not an error.
    pub async fn delete(&self, collection: &str, doc_id: &str) -> Result<()> {
        let mut docs = self.inner.lock().await;
        let exists = docs
            .collections
            .get(collection)
            .is_some_and(|c| c.contains_key(doc_id));
        if !exists {
            return Ok(());
        }
        docs.commit(Change::Delete {
            collection: collection.to_string(),
            doc_id: doc_id.to_string(),
        })
    }

    /// Documents of `collection` matching `filter`, ordered by id.
    pub async fn query(&self, collection: &str, filter: &Filter) -> Vec<Document> {
        let docs = self.inner.lock().await;
        let Some(c) = docs.collections.get(collection) else {
            return Vec::new();
        };
        let matching = c
            .iter()
            .filter(|(_, payload)| filter.matches(payload))
            .map(|(id, payload)| Document::new(id.clone(), payload.clone()));
        match filter.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        }
    }

    pub async fn get(&self, collection: &str, doc_id: &str) -> Option<Value> {
        let docs = self.inner.lock().await;
        docs.collections
            .get(collection)
            .and_then(|c| c.get(doc_id))
            .cloned()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;

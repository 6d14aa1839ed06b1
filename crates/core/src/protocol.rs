// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol between the engine and the remote document store.
//!
//! Every client message carries a `request_id` that the server echoes in
//! its reply, so a client can match replies to requests.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::Filter;
use crate::record::{Document, Mutation, SyncQueueItem};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Write a whole document, replacing any existing one.
    Put {
        request_id: u64,
        collection: String,
        doc_id: String,
        payload: Value,
    },

    /// Merge top-level fields into an existing document.
    ///
    /// The server answers with an error if the document does not exist.
    Patch {
        request_id: u64,
        collection: String,
        doc_id: String,
        payload: Value,
    },

    /// Remove a document. Deleting a missing document succeeds.
    Delete {
        request_id: u64,
        collection: String,
        doc_id: String,
    },

    /// Fetch documents of a collection matching a filter.
    Query {
        request_id: u64,
        collection: String,
        #[serde(default)]
        filter: Filter,
    },

    /// Liveness check.
    Ping { request_id: u64 },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A write was applied.
    Ack { request_id: u64 },

    /// Response to a Query request.
    Documents {
        request_id: u64,
        documents: Vec<Document>,
    },

    /// Response to a Ping request.
    Pong { request_id: u64 },

    /// The request failed.
    Error {
        /// Absent when the request could not be parsed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<u64>,
        /// Human-readable error description.
        message: String,
    },
}

impl ClientMessage {
    /// Creates a Put message.
    pub fn put(request_id: u64, collection: &str, doc_id: &str, payload: Value) -> Self {
        ClientMessage::Put {
            request_id,
            collection: collection.to_string(),
            doc_id: doc_id.to_string(),
            payload,
        }
    }

    /// Creates a Patch message.
    pub fn patch(request_id: u64, collection: &str, doc_id: &str, payload: Value) -> Self {
        ClientMessage::Patch {
            request_id,
            collection: collection.to_string(),
            doc_id: doc_id.to_string(),
            payload,
        }
    }

    /// Creates a Delete message.
    pub fn delete(request_id: u64, collection: &str, doc_id: &str) -> Self {
        ClientMessage::Delete {
            request_id,
            collection: collection.to_string(),
            doc_id: doc_id.to_string(),
        }
    }

    /// Creates a Query message.
    pub fn query(request_id: u64, collection: &str, filter: Filter) -> Self {
        ClientMessage::Query {
            request_id,
            collection: collection.to_string(),
            filter,
        }
    }

    /// Creates a Ping message.
    pub fn ping(request_id: u64) -> Self {
        ClientMessage::Ping { request_id }
    }

    /// Translates a queued mutation into the write that applies it.
    pub fn for_queue_item(request_id: u64, item: &SyncQueueItem) -> Self {
        match &item.mutation {
            Mutation::Create(payload) => {
                Self::put(request_id, &item.collection, &item.doc_id, payload.clone())
            }
            Mutation::Update(payload) => {
                Self::patch(request_id, &item.collection, &item.doc_id, payload.clone())
            }
            Mutation::Delete => Self::delete(request_id, &item.collection, &item.doc_id),
        }
    }

    pub fn request_id(&self) -> u64 {
        match self {
            ClientMessage::Put { request_id, .. }
            | ClientMessage::Patch { request_id, .. }
            | ClientMessage::Delete { request_id, .. }
            | ClientMessage::Query { request_id, .. }
            | ClientMessage::Ping { request_id } => *request_id,
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Creates an Ack message.
    pub fn ack(request_id: u64) -> Self {
        ServerMessage::Ack { request_id }
    }

    /// Creates a Documents message.
    pub fn documents(request_id: u64, documents: Vec<Document>) -> Self {
        ServerMessage::Documents {
            request_id,
            documents,
        }
    }

    /// Creates a Pong message.
    pub fn pong(request_id: u64) -> Self {
        ServerMessage::Pong { request_id }
    }

    /// Creates an Error message answering a request.
    pub fn error(request_id: u64, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            request_id: Some(request_id),
            message: message.into(),
        }
    }

    /// Creates an Error message not tied to a request.
    pub fn unattributed_error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            request_id: None,
            message: message.into(),
        }
    }

    /// The request this message answers, if any.
    pub fn request_id(&self) -> Option<u64> {
        match self {
            ServerMessage::Ack { request_id }
            | ServerMessage::Documents { request_id, .. }
            | ServerMessage::Pong { request_id } => Some(*request_id),
            ServerMessage::Error { request_id, .. } => *request_id,
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;

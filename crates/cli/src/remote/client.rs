// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote document store client.
//!
//! [`RemoteStore`] is the boundary the sync engine writes through.
//! [`WsRemoteStore`] implements it over a [`Transport`], one request at a
//! time, connecting lazily and reconnecting after failures.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use ld_core::protocol::{ClientMessage, ServerMessage};
use ld_core::{Document, Filter, Mutation, SyncQueueItem};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use super::transport::{Transport, TransportError, WebSocketTransport};

/// Errors from remote store calls. All of them are retryable.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("rejected by remote store: {0}")]
    Rejected(String),

    #[error("remote call timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected reply from remote store: {0}")]
    UnexpectedReply(&'static str),
}

/// Result type for remote store calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Boxed future returned by remote store methods.
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = RemoteResult<T>> + Send + 'a>>;

/// A remote store of named documents grouped in collections.
pub trait RemoteStore: Send + Sync {
    /// Writes a document, overwriting any existing one.
    fn create<'a>(
        &'a self,
        collection: &'a str,
        doc_id: &'a str,
        payload: &'a Value,
    ) -> RemoteFuture<'a, ()>;

    /// Merges top-level fields into an existing document.
    fn update<'a>(
        &'a self,
        collection: &'a str,
        doc_id: &'a str,
        payload: &'a Value,
    ) -> RemoteFuture<'a, ()>;

    /// Deletes a document; deleting a missing document succeeds.
    fn delete<'a>(&'a self, collection: &'a str, doc_id: &'a str) -> RemoteFuture<'a, ()>;

    /// Documents of `collection` matching `filter`.
    fn query<'a>(&'a self, collection: &'a str, filter: &'a Filter)
        -> RemoteFuture<'a, Vec<Document>>;

    /// Checks that the store is reachable.
    fn ping(&self) -> RemoteFuture<'_, ()>;
}

/// Applies one queued mutation through `remote`.
pub async fn apply_mutation(remote: &dyn RemoteStore, item: &SyncQueueItem) -> RemoteResult<()> {
    match &item.mutation {
        Mutation::Create(payload) => remote.create(&item.collection, &item.doc_id, payload).await,
        Mutation::Update(payload) => remote.update(&item.collection, &item.doc_id, payload).await,
        Mutation::Delete => remote.delete(&item.collection, &item.doc_id).await,
    }
}

/// Connection settings for [`WsRemoteStore`].
#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub url: String,
    pub connect_timeout: Duration,
    /// Upper bound for one request, including any reconnect.
    pub request_timeout: Duration,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings {
            url: "ws://localhost:7891".to_string(),
            connect_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// [`RemoteStore`] speaking the JSON protocol over a [`Transport`].
pub struct WsRemoteStore<T: Transport = WebSocketTransport> {
    settings: RemoteSettings,
    next_id: AtomicU64,
    transport: Mutex<T>,
}

impl WsRemoteStore<WebSocketTransport> {
    /// Creates a client that connects on first use.
    pub fn new(settings: RemoteSettings) -> Self {
        Self::with_transport(WebSocketTransport::new(), settings)
    }
}

impl<T: Transport> WsRemoteStore<T> {
    pub fn with_transport(transport: T, settings: RemoteSettings) -> Self {
        WsRemoteStore {
            settings,
            next_id: AtomicU64::new(1),
            transport: Mutex::new(transport),
        }
    }

    pub fn url(&self) -> &str {
        &self.settings.url
    }

    pub async fn is_connected(&self) -> bool {
        self.transport.lock().await.is_connected()
    }

    /// Closes the connection; the next call reconnects.
    pub async fn disconnect(&self) {
        let mut transport = self.transport.lock().await;
        let _ = transport.disconnect().await;
    }

    fn next_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Sends `msg` and waits for the reply carrying its request id.
    async fn request(&self, msg: ClientMessage) -> RemoteResult<ServerMessage> {
        let mut transport = self.transport.lock().await;
        let timeout = self.settings.request_timeout;

        match tokio::time::timeout(timeout, exchange(&mut *transport, &self.settings, msg)).await
        {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(e)) => {
                if matches!(e, RemoteError::Transport(_)) {
                    let _ = transport.disconnect().await;
                }
                Err(e)
            }
            Err(_) => {
                // A late reply would answer the wrong request; start fresh.
                let _ = transport.disconnect().await;
                Err(RemoteError::Timeout(timeout))
            }
        }
    }
}

async fn exchange<T: Transport>(
    transport: &mut T,
    settings: &RemoteSettings,
    msg: ClientMessage,
) -> RemoteResult<ServerMessage> {
    if !transport.is_connected() {
        debug!(url = %settings.url, "connecting to remote store");
        tokio::time::timeout(settings.connect_timeout, transport.connect(&settings.url))
            .await
            .map_err(|_| {
                TransportError::ConnectionFailed(format!(
                    "timed out after {:?}",
                    settings.connect_timeout
                ))
            })??;
    }

    let request_id = msg.request_id();
    transport.send(msg).await?;

    loop {
        match transport.recv().await? {
            Some(reply) => match reply.request_id() {
                Some(id) if id == request_id => return Ok(reply),
                // Unattributed errors answer whatever is in flight.
                None => return Ok(reply),
                Some(stale) => debug!(stale, request_id, "discarding stale reply"),
            },
            None => return Err(TransportError::ConnectionClosed.into()),
        }
    }
}

fn reply_kind(reply: &ServerMessage) -> &'static str {
    match reply {
        ServerMessage::Ack { .. } => "ack",
        ServerMessage::Documents { .. } => "documents",
        ServerMessage::Pong { .. } => "pong",
        ServerMessage::Error { .. } => "error",
    }
}

fn expect_ack(reply: ServerMessage) -> RemoteResult<()> {
    match reply {
        ServerMessage::Ack { .. } => Ok(()),
        ServerMessage::Error { message, .. } => Err(RemoteError::Rejected(message)),
        other => Err(RemoteError::UnexpectedReply(reply_kind(&other))),
    }
}

impl<T: Transport> RemoteStore for WsRemoteStore<T> {
    fn create<'a>(
        &'a self,
        collection: &'a str,
        doc_id: &'a str,
        payload: &'a Value,
    ) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            let msg = ClientMessage::put(self.next_request_id(), collection, doc_id, payload.clone());
            expect_ack(self.request(msg).await?)
        })
    }

    fn update<'a>(
        &'a self,
        collection: &'a str,
        doc_id: &'a str,
        payload: &'a Value,
    ) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            let msg =
                ClientMessage::patch(self.next_request_id(), collection, doc_id, payload.clone());
            expect_ack(self.request(msg).await?)
        })
    }

    fn delete<'a>(&'a self, collection: &'a str, doc_id: &'a str) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            let msg = ClientMessage::delete(self.next_request_id(), collection, doc_id);
            expect_ack(self.request(msg).await?)
        })
    }

    fn query<'a>(
        &'a self,
        collection: &'a str,
        filter: &'a Filter,
    ) -> RemoteFuture<'a, Vec<Document>> {
        Box::pin(async move {
            let msg = ClientMessage::query(self.next_request_id(), collection, filter.clone());
            match self.request(msg).await? {
                ServerMessage::Documents { documents, .. } => Ok(documents),
                ServerMessage::Error { message, .. } => Err(RemoteError::Rejected(message)),
                other => Err(RemoteError::UnexpectedReply(reply_kind(&other))),
            }
        })
    }

    fn ping(&self) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            let msg = ClientMessage::ping(self.next_request_id());
            match self.request(msg).await? {
                ServerMessage::Pong { .. } => Ok(()),
                ServerMessage::Error { message, .. } => Err(RemoteError::Rejected(message)),
                other => Err(RemoteError::UnexpectedReply(reply_kind(&other))),
            }
        })
    }
}

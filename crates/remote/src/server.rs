// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket server implementation.
//!
//! Each connection is served by its own task. Requests on one connection
//! are answered in order; every reply echoes the request's `request_id`.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info};

use ld_core::protocol::{ClientMessage, ServerMessage};

use crate::state::ServerState;

/// Run the WebSocket server on the given listener.
pub async fn run(
    listener: TcpListener,
    state: ServerState,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Listening on: {}", listener.local_addr()?);

    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let state = state.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }
}

/// Handle a single WebSocket connection.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: ServerState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    info!("New WebSocket connection from: {}", peer_addr);

    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    while let Some(msg) = ws_stream.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let response = handle_client_message(&text, &state).await;
                ws_sink.send(Message::Text(response.to_json()?.into())).await?;
            }
            Ok(Message::Close(_)) => {
                info!("Client {} disconnected", peer_addr);
                break;
            }
            Ok(Message::Ping(data)) => {
                ws_sink.send(Message::Pong(data)).await?;
            }
            Ok(_) => {
                // Ignore other message types (Binary, Pong, Frame)
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", peer_addr, e);
                break;
            }
        }
    }

    info!("Connection closed: {}", peer_addr);
    Ok(())
}

/// Process a client message and return the reply.
pub(crate) async fn handle_client_message(text: &str, state: &ServerState) -> ServerMessage {
    let msg = match ClientMessage::from_json(text) {
        Ok(msg) => msg,
        Err(e) => {
            debug!("Unparsable message: {}", e);
            return ServerMessage::unattributed_error(format!("invalid message: {e}"));
        }
    };
    debug!("Received message: {:?}", msg);

    let request_id = msg.request_id();
    let result = match msg {
        ClientMessage::Put {
            collection,
            doc_id,
            payload,
            ..
        } => state
            .put(&collection, &doc_id, payload)
            .await
            .map(|()| ServerMessage::ack(request_id)),

        ClientMessage::Patch {
            collection,
            doc_id,
            payload,
            ..
        } => state
            .patch(&collection, &doc_id, payload)
            .await
            .map(|()| ServerMessage::ack(request_id)),

        ClientMessage::Delete {
            collection, doc_id, ..
        } => state
            .delete(&collection, &doc_id)
            .await
            .map(|()| ServerMessage::ack(request_id)),

        ClientMessage::Query {
            collection, filter, ..
        } => {
            let documents = state.query(&collection, &filter).await;
            debug!("Query response: {} documents from {}", documents.len(), collection);
            Ok(ServerMessage::documents(request_id, documents))
        }

        ClientMessage::Ping { .. } => Ok(ServerMessage::pong(request_id)),
    };

    result.unwrap_or_else(|e| ServerMessage::error(request_id, e.to_string()))
}

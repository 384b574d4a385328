//! WebSocket handler for real-time catalog updates
//!
//! Clients only listen: every connection is registered with the
//! broadcaster and receives each `CatalogEvent` as a JSON text frame.
//! Inbound frames are read solely to notice when the client goes away.

use crate::services::Broadcaster;
use crate::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Handle WebSocket upgrade
pub async fn handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let broadcaster = state.broadcaster.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, broadcaster))
}

async fn handle_socket(socket: WebSocket, broadcaster: Arc<Broadcaster>) {
    let (mut sender, mut receiver) = socket.split();
    let (client_id, mut rx) = broadcaster.register();
    info!("New WebSocket connection: {}", client_id);

    // Forward events from the registry to the socket. Ends when the client
    // is unregistered (or the registry is closed) and the channel drains.
    let _forward_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    warn!("Failed to encode {}: {}", event.name(), e);
                    continue;
                }
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Close(_)) => break,
            Ok(Message::Text(text)) => {
                debug!("Ignoring {} byte message from {}", text.len(), client_id);
            }
            Ok(_) => {}
            Err(e) => {
                debug!("WebSocket error on {}: {}", client_id, e);
                break;
            }
        }
    }

    // The forward task exits on its own once the registry drops the sender
    broadcaster.unregister(&client_id);

    info!("WebSocket connection ended: {}", client_id);
}

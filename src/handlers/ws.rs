//! WebSocket handler: channel handshake, inbound message routing, teardown.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::handlers::http::{AppState, ChannelQuery};
use crate::models::connection::generate_socket_id;
use crate::models::message::{ClientMessage, WsEvent};
use crate::services::EventRouter;

/// Upgrade HTTP to WebSocket. A missing channel rejects the handshake with 400.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(query): Query<ChannelQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let channel = EventRouter::accept(query.channel.as_deref())?;
    Ok(ws.on_upgrade(move |socket| handle_socket(state, socket, channel)))
}

async fn handle_socket(state: AppState, socket: WebSocket, channel: String) {
    let socket_id = generate_socket_id();
    info!(socket_id = %socket_id, channel = %channel, "ws connected");

    let (mut sender, mut receiver) = socket.split();

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    let router = &state.router;
    if let Err(e) = router.on_connect(&channel, &socket_id, tx).await {
        error!(socket_id = %socket_id, error = %e, "connect handling failed");
    }

    // One event at a time per connection: the next frame is read only after routing completes.
    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Message { data }) => {
                    if let Err(e) = router.on_message(&channel, &socket_id, data).await {
                        error!(socket_id = %socket_id, error = %e, "message handling failed");
                    }
                }
                Ok(ClientMessage::Ping) => {
                    if let Ok(pong) = serde_json::to_string(&WsEvent::pong()) {
                        state.channels().send_frame(&channel, &socket_id, pong).await;
                    }
                }
                Err(e) => {
                    warn!(socket_id = %socket_id, error = %e, "ignoring malformed frame");
                }
            },
            Message::Close(_) => break,
            _ => debug!(socket_id = %socket_id, "ignoring non-text frame"),
        }
    }

    router.on_disconnect(&channel, &socket_id).await;
    send_task.abort();
    info!(socket_id = %socket_id, channel = %channel, "ws disconnected");
}

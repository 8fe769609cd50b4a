//! HTTP handlers: channel ingestion and health.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::AppError;
use crate::models::message::{now_millis, ChannelMessage, SENDER_PROXY};
use crate::services::{ChannelService, EventRouter};

/// Shared application state for HTTP and WS handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: EventRouter,
}

impl AppState {
    pub fn new(router: EventRouter) -> Self {
        Self { router }
    }

    pub fn channels(&self) -> &ChannelService {
        self.router.channels()
    }
}

#[derive(Debug, Deserialize)]
pub struct ChannelQuery {
    pub channel: Option<String>,
}

/// POST /proxy?channel=<name> — broadcast the JSON body to a channel without a live connection.
/// Never consults the mediator. The channel is checked before the body is parsed.
pub async fn ingest(
    State(state): State<AppState>,
    Query(query): Query<ChannelQuery>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let channel = EventRouter::accept(query.channel.as_deref())?;
    let body: serde_json::Value = serde_json::from_slice(&body)?;

    let delivered = state
        .channels()
        .broadcast(&channel, ChannelMessage::from_sender(body, SENDER_PROXY))
        .await?;
    info!(channel = %channel, delivered, "ingested message");

    Ok(Json(json!({
        "success": true,
        "channel": channel,
        "message": format!("Message broadcast to channel {}", channel),
        "delivered": delivered
    })))
}

/// GET /health — liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "timestamp": now_millis() })),
    )
}

//! Channel message envelope and WebSocket frame models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved `sender` tag for server-synthesized welcome messages.
pub const SENDER_SYSTEM: &str = "system";
/// Reserved `sender` tag for messages injected through the ingestion endpoint.
pub const SENDER_PROXY: &str = "proxy";
/// Reserved `sender` tag for transport-level replies (e.g. pong).
pub const SENDER_SERVER: &str = "server";

/// Milliseconds since the Unix epoch, read at call time.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Message delivered to connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMessage {
    #[serde(default)]
    pub data: Value,
    /// Milliseconds since epoch.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
}

impl ChannelMessage {
    /// Build a message stamped with the current time.
    pub fn new(data: Value, sender: Option<String>) -> Self {
        Self {
            data,
            timestamp: now_millis(),
            sender,
        }
    }

    pub fn from_sender(data: Value, sender: impl Into<String>) -> Self {
        Self::new(data, Some(sender.into()))
    }

    /// Welcome message sent on connect when no mediator is configured.
    pub fn welcome(channel: &str) -> Self {
        Self::from_sender(
            serde_json::json!({ "text": format!("Welcome to channel: {}", channel) }),
            SENDER_SYSTEM,
        )
    }
}

/// Frame sent over WebSocket to clients. `data` is a `ChannelMessage`, or a mediator-supplied
/// message object passed through as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsEvent<T = ChannelMessage> {
    pub event: String,
    pub data: T,
}

impl<T> WsEvent<T> {
    pub fn message(data: T) -> Self {
        Self {
            event: "message".to_string(),
            data,
        }
    }
}

impl WsEvent {
    pub fn pong() -> Self {
        Self {
            event: "pong".to_string(),
            data: ChannelMessage::from_sender(serde_json::json!({}), SENDER_SERVER),
        }
    }
}

/// WebSocket client frame: inbound message or keep-alive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientMessage {
    Message {
        #[serde(default)]
        data: Value,
    },
    Ping,
}

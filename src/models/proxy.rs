//! Mediator ("proxy") event payloads, responses, and configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::now_millis;

/// Lifecycle event forwarded to the mediator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyEvent {
    Connection,
    Message,
    Disconnect,
}

impl ProxyEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyEvent::Connection => "connection",
            ProxyEvent::Message => "message",
            ProxyEvent::Disconnect => "disconnect",
        }
    }
}

/// Body POSTed to the mediator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEventPayload {
    pub event: ProxyEvent,
    pub channel: String,
    pub socket_id: String,
    pub timestamp: i64,
    /// Only present for `message` events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ProxyEventPayload {
    pub fn connection(channel: &str, socket_id: &str) -> Self {
        Self::build(ProxyEvent::Connection, channel, socket_id, None)
    }

    pub fn message(channel: &str, socket_id: &str, data: Value) -> Self {
        Self::build(ProxyEvent::Message, channel, socket_id, Some(data))
    }

    pub fn disconnect(channel: &str, socket_id: &str) -> Self {
        Self::build(ProxyEvent::Disconnect, channel, socket_id, None)
    }

    fn build(event: ProxyEvent, channel: &str, socket_id: &str, data: Option<Value>) -> Self {
        Self {
            event,
            channel: channel.to_string(),
            socket_id: socket_id.to_string(),
            timestamp: now_millis(),
            data,
        }
    }
}

/// Mediator reply. Both fields may be absent.
///
/// Entries are kept as raw JSON so that fields the relay does not know about reach the client
/// unchanged, and one loosely typed entry cannot void the rest of the reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyEventResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Value>>,
}

impl ProxyEventResponse {
    /// Messages to deliver to the originating connection, in order.
    /// A non-empty `messages` wins over `message`; neither present yields nothing.
    pub fn into_deliveries(self) -> Vec<Value> {
        let messages = match (self.messages, self.message) {
            (Some(messages), _) if !messages.is_empty() => messages,
            (_, Some(message)) if !message.is_null() => vec![message],
            _ => Vec::new(),
        };
        messages.into_iter().map(stamp_message).collect()
    }
}

/// Give a mediator message a `timestamp` unless it already carries a numeric one.
/// Non-object entries become the `data` of a fresh message.
pub fn stamp_message(message: Value) -> Value {
    match message {
        Value::Object(mut fields) => {
            if !fields.get("timestamp").is_some_and(Value::is_number) {
                fields.insert("timestamp".to_string(), Value::from(now_millis()));
            }
            Value::Object(fields)
        }
        other => serde_json::json!({ "data": other, "timestamp": now_millis() }),
    }
}

/// Mediator endpoint and optional bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub url: String,
    pub bearer_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn msg(text: &str) -> Value {
        json!({ "data": { "text": text } })
    }

    #[test]
    fn connection_payload_has_no_data_field() {
        let value = serde_json::to_value(ProxyEventPayload::connection("lobby", "1.a")).unwrap();
        assert_eq!(value["event"], "connection");
        assert_eq!(value["channel"], "lobby");
        assert_eq!(value["socketId"], "1.a");
        assert!(value["timestamp"].as_i64().unwrap() > 0);
        assert!(value.get("data").is_none());
    }

    #[test]
    fn message_payload_carries_data() {
        let value =
            serde_json::to_value(ProxyEventPayload::message("lobby", "1.a", json!({"k": 2})))
                .unwrap();
        assert_eq!(value["event"], "message");
        assert_eq!(value["data"], json!({"k": 2}));
    }

    #[test]
    fn messages_take_priority_over_message() {
        let response = ProxyEventResponse {
            message: Some(msg("single")),
            messages: Some(vec![msg("a"), msg("b")]),
        };
        let out = response.into_deliveries();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["data"]["text"], "a");
        assert_eq!(out[1]["data"]["text"], "b");
    }

    #[test]
    fn empty_messages_falls_back_to_message() {
        let response = ProxyEventResponse {
            message: Some(msg("single")),
            messages: Some(vec![]),
        };
        let out = response.into_deliveries();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["data"]["text"], "single");
    }

    #[test]
    fn empty_response_yields_nothing() {
        let response: ProxyEventResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_deliveries().is_empty());

        let unknown: ProxyEventResponse = serde_json::from_str(r#"{"other":true}"#).unwrap();
        assert!(unknown.into_deliveries().is_empty());

        let null: ProxyEventResponse = serde_json::from_str(r#"{"message":null}"#).unwrap();
        assert!(null.into_deliveries().is_empty());
    }

    #[test]
    fn loosely_typed_entries_survive_decoding() {
        let response: ProxyEventResponse = serde_json::from_str(
            r#"{"messages":[{"data":"A"},{"data":"B","timestamp":1700000000000.5},{"data":"C","timestamp":"soon"}]}"#,
        )
        .unwrap();
        let out = response.into_deliveries();
        assert_eq!(out.len(), 3);
        assert!(out[0]["timestamp"].as_i64().unwrap() > 0);
        assert_eq!(out[1]["timestamp"], json!(1700000000000.5));
        assert!(out[2]["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn stamp_keeps_numeric_timestamp_and_extra_fields() {
        let kept = stamp_message(json!({ "data": 1, "timestamp": 42, "type": "alert" }));
        assert_eq!(kept, json!({ "data": 1, "timestamp": 42, "type": "alert" }));

        let wrapped = stamp_message(json!("bare"));
        assert_eq!(wrapped["data"], "bare");
        assert!(wrapped["timestamp"].as_i64().unwrap() > 0);
    }
}

//! Channel membership and delivery: channel -> live connections, fan-out to their outbound queues.

use crate::error::AppResult;
use crate::models::message::{ChannelMessage, WsEvent};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};

/// Outbound queue of a single connection. Frames are serialized `WsEvent` JSON.
pub type Outbound = mpsc::UnboundedSender<String>;

/// Tracks which connections belong to which channel and delivers frames to them.
///
/// Channels are implicit: a key exists while at least one connection is joined.
#[derive(Clone, Default)]
pub struct ChannelService {
    /// channel_name -> (socket_id -> outbound queue).
    channels: Arc<RwLock<HashMap<String, HashMap<String, Outbound>>>>,
}

impl ChannelService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a channel's broadcast group.
    pub async fn join(&self, channel: &str, socket_id: &str, tx: Outbound) {
        let mut channels = self.channels.write().await;
        channels
            .entry(channel.to_string())
            .or_default()
            .insert(socket_id.to_string(), tx);
        debug!(channel = %channel, socket_id = %socket_id, "joined channel");
    }

    /// Remove a connection; the channel key goes away with its last member.
    pub async fn leave(&self, channel: &str, socket_id: &str) {
        let mut channels = self.channels.write().await;
        if let Some(members) = channels.get_mut(channel) {
            members.remove(socket_id);
            if members.is_empty() {
                channels.remove(channel);
            }
        }
        debug!(channel = %channel, socket_id = %socket_id, "left channel");
    }

    /// Deliver a message to one connection only. Returns whether it was queued.
    pub async fn send_to<T: Serialize>(
        &self,
        channel: &str,
        socket_id: &str,
        message: T,
    ) -> AppResult<bool> {
        let frame = serde_json::to_string(&WsEvent::message(message))?;
        let channels = self.channels.read().await;
        let sent = channels
            .get(channel)
            .and_then(|members| members.get(socket_id))
            .map(|tx| tx.send(frame).is_ok())
            .unwrap_or(false);
        if !sent {
            debug!(channel = %channel, socket_id = %socket_id, "send_to: connection gone");
        }
        Ok(sent)
    }

    /// Send a raw frame to one connection, bypassing the message envelope.
    pub async fn send_frame(&self, channel: &str, socket_id: &str, frame: String) -> bool {
        let channels = self.channels.read().await;
        channels
            .get(channel)
            .and_then(|members| members.get(socket_id))
            .map(|tx| tx.send(frame).is_ok())
            .unwrap_or(false)
    }

    /// Deliver a message to every current member of the channel, sender included.
    /// Returns the number of connections it was queued for; zero members is not an error.
    pub async fn broadcast(&self, channel: &str, message: ChannelMessage) -> AppResult<usize> {
        let frame = serde_json::to_string(&WsEvent::message(message))?;
        let channels = self.channels.read().await;
        let count = channels
            .get(channel)
            .map(|members| {
                members
                    .values()
                    .filter(|tx| tx.send(frame.clone()).is_ok())
                    .count()
            })
            .unwrap_or(0);
        info!(channel = %channel, count, "broadcast");
        Ok(count)
    }

    /// Number of connections currently joined to the channel.
    pub async fn member_count(&self, channel: &str) -> usize {
        let channels = self.channels.read().await;
        channels.get(channel).map(HashMap::len).unwrap_or(0)
    }
}

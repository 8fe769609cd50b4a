//! Lifecycle event routing: connect, inbound message, disconnect.
//!
//! With a mediator configured every connect/message event is round-tripped through it and only
//! its reply is delivered, to the originating connection. Without one, connect yields a welcome
//! message and inbound messages are broadcast to the whole channel, sender included.

use crate::error::{AppError, AppResult};
use crate::models::message::ChannelMessage;
use crate::models::proxy::ProxyEventPayload;
use crate::services::channel::{ChannelService, Outbound};
use crate::services::proxy::{ProxyClient, ProxyOutcome};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

#[derive(Clone)]
pub struct EventRouter {
    channels: ChannelService,
    proxy: ProxyClient,
}

impl EventRouter {
    pub fn new(channels: ChannelService, proxy: ProxyClient) -> Self {
        Self { channels, proxy }
    }

    pub fn channels(&self) -> &ChannelService {
        &self.channels
    }

    pub fn is_mediated(&self) -> bool {
        self.proxy.is_enabled()
    }

    /// Validate the channel tag from the handshake. A missing or empty tag rejects the connection.
    pub fn accept(channel: Option<&str>) -> AppResult<String> {
        match channel {
            Some(c) if !c.trim().is_empty() => Ok(c.to_string()),
            _ => {
                warn!("rejected: channel is required");
                Err(AppError::InvalidRequest("channel is required".to_string()))
            }
        }
    }

    /// Join the connection to its channel, then greet it (mediator reply or default welcome).
    #[instrument(skip(self, tx))]
    pub async fn on_connect(&self, channel: &str, socket_id: &str, tx: Outbound) -> AppResult<()> {
        self.channels.join(channel, socket_id, tx).await;
        info!("connection active");

        if self.proxy.is_enabled() {
            let outcome = self
                .proxy
                .send(&ProxyEventPayload::connection(channel, socket_id))
                .await;
            self.deliver(channel, socket_id, outcome).await
        } else {
            self.channels
                .send_to(channel, socket_id, ChannelMessage::welcome(channel))
                .await?;
            Ok(())
        }
    }

    /// Route one inbound message. Mediated mode never falls through to the channel broadcast.
    #[instrument(skip(self, data))]
    pub async fn on_message(&self, channel: &str, socket_id: &str, data: Value) -> AppResult<()> {
        if self.proxy.is_enabled() {
            let outcome = self
                .proxy
                .send(&ProxyEventPayload::message(channel, socket_id, data))
                .await;
            self.deliver(channel, socket_id, outcome).await
        } else {
            let message = ChannelMessage::from_sender(data, socket_id);
            self.channels.broadcast(channel, message).await?;
            Ok(())
        }
    }

    /// Tear down the connection. The mediator notification runs detached and is never awaited.
    #[instrument(skip(self))]
    pub async fn on_disconnect(&self, channel: &str, socket_id: &str) {
        self.channels.leave(channel, socket_id).await;

        if self.proxy.is_enabled() {
            let proxy = self.proxy.clone();
            let payload = ProxyEventPayload::disconnect(channel, socket_id);
            tokio::spawn(async move {
                if let ProxyOutcome::Response(_) = proxy.send(&payload).await {
                    debug!(socket_id = %payload.socket_id, "disconnect acknowledged");
                }
            });
        }
        info!("connection closed");
    }

    async fn deliver(&self, channel: &str, socket_id: &str, outcome: ProxyOutcome) -> AppResult<()> {
        let messages = match outcome {
            ProxyOutcome::Response(response) => response.into_deliveries(),
            ProxyOutcome::NoOpinion => Vec::new(),
        };
        debug!(count = messages.len(), "delivering mediator reply");
        for message in messages {
            self.channels.send_to(channel, socket_id, message).await?;
        }
        Ok(())
    }
}

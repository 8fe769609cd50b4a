//! HTTP client for the external mediator. Every failure degrades to `ProxyOutcome::NoOpinion`.

use crate::error::AppResult;
use crate::models::proxy::{ProxyConfig, ProxyEventPayload, ProxyEventResponse};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, instrument};

/// Result of consulting the mediator.
#[derive(Debug)]
pub enum ProxyOutcome {
    Response(ProxyEventResponse),
    /// No mediator configured, or the round trip failed.
    NoOpinion,
}

#[derive(Debug, Error)]
enum ProxyError {
    #[error("mediator responded with {0}")]
    Status(StatusCode),
    #[error("mediator request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Forwards lifecycle events to the configured mediator.
#[derive(Clone)]
pub struct ProxyClient {
    config: Option<Arc<ProxyConfig>>,
    http: reqwest::Client,
}

impl ProxyClient {
    /// Build a client; `timeout` bounds each round trip.
    pub fn new(config: Option<ProxyConfig>, timeout: Duration) -> AppResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            config: config.map(Arc::new),
            http,
        })
    }

    /// A client with no mediator; `send` always returns `NoOpinion`.
    pub fn disabled() -> Self {
        Self {
            config: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    /// POST the payload to the mediator and interpret its reply.
    #[instrument(skip(self, payload), fields(event = payload.event.as_str(), socket_id = %payload.socket_id))]
    pub async fn send(&self, payload: &ProxyEventPayload) -> ProxyOutcome {
        let Some(config) = self.config.as_deref() else {
            return ProxyOutcome::NoOpinion;
        };
        match self.post(config, payload).await {
            Ok(response) => {
                debug!(channel = %payload.channel, "mediator replied");
                ProxyOutcome::Response(response)
            }
            Err(e) => {
                error!(channel = %payload.channel, url = %config.url, error = %e, "mediator call failed");
                ProxyOutcome::NoOpinion
            }
        }
    }

    async fn post(
        &self,
        config: &ProxyConfig,
        payload: &ProxyEventPayload,
    ) -> Result<ProxyEventResponse, ProxyError> {
        let mut request = self.http.post(&config.url).json(payload);
        if let Some(token) = &config.bearer_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::Status(status));
        }
        Ok(response.json::<ProxyEventResponse>().await?)
    }
}

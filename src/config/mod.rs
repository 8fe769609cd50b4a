//! Application configuration loaded from environment.

use std::net::SocketAddr;
use std::time::Duration;

use crate::models::proxy::ProxyConfig;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_PROXY_TIMEOUT_MS: u64 = 10_000;

/// Application configuration loaded from `.env` and environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g. `0.0.0.0:3000`).
    pub server_addr: SocketAddr,
    /// Allowed CORS origin; `*` allows any.
    pub cors_origin: String,
    /// External mediator. `None` means default broadcast mode.
    pub proxy: Option<ProxyConfig>,
    /// Total timeout for one mediator round trip.
    pub proxy_timeout: Duration,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (used by `from_env` and tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(p) => p.trim().parse().map_err(|_| ConfigLoadError::InvalidPort(p))?,
            None => DEFAULT_PORT,
        };
        let server_addr = var("SERVER_ADDR").unwrap_or_else(|| format!("0.0.0.0:{}", port));
        let server_addr: SocketAddr = server_addr
            .parse()
            .map_err(|_| ConfigLoadError::InvalidServerAddr(server_addr))?;

        let cors_origin = var("CORS_ORIGIN").unwrap_or_else(|| "*".to_string());

        let proxy = var("PROXY_URL").map(|url| ProxyConfig {
            url,
            bearer_token: var("PROXY_BEARER_TOKEN"),
        });

        let proxy_timeout = match var("PROXY_TIMEOUT_MS") {
            Some(ms) => Duration::from_millis(
                ms.trim()
                    .parse()
                    .map_err(|_| ConfigLoadError::InvalidProxyTimeout(ms))?,
            ),
            None => Duration::from_millis(DEFAULT_PROXY_TIMEOUT_MS),
        };

        let log_level = var("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            server_addr,
            cors_origin,
            proxy,
            proxy_timeout,
            log_level,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Invalid SERVER_ADDR: {0}")]
    InvalidServerAddr(String),
    #[error("Invalid PORT: {0}")]
    InvalidPort(String),
    #[error("Invalid PROXY_TIMEOUT_MS: {0}")]
    InvalidProxyTimeout(String),
}

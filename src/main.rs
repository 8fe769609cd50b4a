//! Entry point: load config, wire dependencies, and run the server.

use chanrelay::config::Config;
use chanrelay::services::{ChannelService, EventRouter, ProxyClient};
use chanrelay::{create_app, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &config.proxy {
        Some(proxy) => tracing::info!(
            url = %proxy.url,
            bearer = proxy.bearer_token.is_some(),
            timeout_ms = config.proxy_timeout.as_millis() as u64,
            "mediator enabled"
        ),
        None => tracing::info!("no mediator configured, using default broadcast"),
    }

    let proxy = ProxyClient::new(config.proxy.clone(), config.proxy_timeout)?;
    let router = EventRouter::new(ChannelService::new(), proxy);
    let app = create_app(AppState::new(router), &config.cors_origin);

    tracing::info!(addr = %config.server_addr, cors_origin = %config.cors_origin, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

//! Channel-scoped real-time message relay built with Rust.
//!
//! Clients connect over WebSocket with a `channel` tag; messages fan out to every connection in
//! that channel. An optional external mediator can take over routing: each connect, message, and
//! disconnect event is POSTed to it and its reply is delivered to the originating connection.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;
pub use services::channel::ChannelService;
pub use services::proxy::ProxyClient;
pub use services::router::EventRouter;

use axum::routing::{get, post};
use handlers::http;
use tower_http::trace::TraceLayer;

/// Build the relay router (ws, ingestion, health). Used by main and by integration tests.
pub fn create_app(state: AppState, cors_origin: &str) -> axum::Router {
    axum::Router::new()
        .route("/ws", get(handlers::ws_handler))
        .route("/proxy", post(http::ingest))
        .route("/health", get(http::health))
        .layer(middleware::cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

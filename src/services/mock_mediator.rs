//! In-process mediator for tests: records each request and replies as configured.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

pub(crate) enum MockReply {
    Json(Value),
    Status(StatusCode),
    /// 200 with a non-JSON body.
    Raw(String),
    /// Never respond.
    Hang,
}

#[derive(Debug)]
pub(crate) struct Recorded {
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

pub(crate) struct MockMediator {
    pub url: String,
    pub requests: mpsc::UnboundedReceiver<Recorded>,
}

type ReplyFn = dyn Fn(&Value) -> MockReply + Send + Sync;

#[derive(Clone)]
struct MockState {
    tx: mpsc::UnboundedSender<Recorded>,
    reply: Arc<ReplyFn>,
}

pub(crate) async fn spawn<F>(reply: F) -> MockMediator
where
    F: Fn(&Value) -> MockReply + Send + Sync + 'static,
{
    let (tx, requests) = mpsc::unbounded_channel();
    let state = MockState {
        tx,
        reply: Arc::new(reply),
    };
    let app = Router::new().route("/events", post(handle)).with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    MockMediator {
        url: format!("http://{}/events", addr),
        requests,
    }
}

async fn handle(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    let reply = (state.reply)(&body);
    let _ = state.tx.send(Recorded {
        authorization: header_str(header::AUTHORIZATION),
        content_type: header_str(header::CONTENT_TYPE),
        body,
    });
    match reply {
        MockReply::Json(v) => Json(v).into_response(),
        MockReply::Status(status) => status.into_response(),
        MockReply::Raw(text) => text.into_response(),
        MockReply::Hang => {
            std::future::pending::<()>().await;
            StatusCode::OK.into_response()
        }
    }
}

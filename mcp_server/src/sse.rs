//! Networked SSE transport.
//!
//! `GET /sse` opens a session: the first event (`endpoint`) tells the client
//! where to POST its requests, including the session ID. `POST
//! /message?sessionId=` accepts one JSON-RPC request, answers `202
//! Accepted`, and delivers the JSON-RPC response as a `message` event on the
//! session stream. Each POST runs on its own task, so invocations from one
//! client execute concurrently.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::Router;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::server::{JsonRpcRequest, JsonRpcResponse, McpServer, PARSE_ERROR};

/// Configuration for the SSE transport.
#[derive(Debug, Clone)]
pub struct SseServerConfig {
    /// Address to bind.
    pub bind_addr: SocketAddr,
    /// Public base URL advertised in the endpoint handshake.
    pub base_url: String,
}

impl SseServerConfig {
    /// Bind all interfaces on `port`, advertising `base_url` to clients.
    pub fn new(port: u16, base_url: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

type SessionMap = Arc<RwLock<HashMap<String, mpsc::Sender<JsonRpcResponse>>>>;

#[derive(Clone)]
struct SseState {
    server: McpServer,
    sessions: SessionMap,
    base_url: String,
}

/// SSE server wrapping an [`McpServer`].
pub struct SseServer {
    config: SseServerConfig,
    server: McpServer,
}

impl SseServer {
    pub fn new(config: SseServerConfig, server: McpServer) -> Self {
        Self { config, server }
    }

    /// Build the transport router (exposed for tests).
    pub fn router(&self) -> Router {
        let state = SseState {
            server: self.server.clone(),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            base_url: self.config.base_url.clone(),
        };

        Router::new()
            .route("/sse", get(open_session))
            .route("/message", post(post_message))
            .with_state(state)
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(TraceLayer::new_for_http())
    }

    /// Bind and serve until the process exits.
    pub async fn serve(self) -> std::io::Result<()> {
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        info!(addr = %self.config.bind_addr, "MCP server (SSE) listening");
        axum::serve(listener, router).await
    }
}

// Removes the session entry when the client stream is dropped.
struct SessionGuard {
    id: String,
    sessions: SessionMap,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.remove(&self.id);
        }
        debug!(session = %self.id, "SSE session closed");
    }
}

async fn open_session(
    State(state): State<SseState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = Uuid::new_v4().to_string();
    let (tx, rx) = mpsc::channel::<JsonRpcResponse>(32);
    state
        .sessions
        .write()
        .expect("session map poisoned")
        .insert(session_id.clone(), tx);
    info!(session = %session_id, "SSE session opened");

    let endpoint = format!("{}/message?sessionId={}", state.base_url, session_id);
    let guard = SessionGuard {
        id: session_id,
        sessions: state.sessions.clone(),
    };

    let handshake = stream::once(async move {
        Ok::<_, Infallible>(Event::default().event("endpoint").data(endpoint))
    });
    let messages = ReceiverStream::new(rx).map(move |response| {
        let _session = &guard;
        let data = match serde_json::to_string(&response) {
            Ok(data) => data,
            Err(err) => {
                warn!(error = %err, "failed to serialize response");
                "{}".to_string()
            }
        };
        Ok::<_, Infallible>(Event::default().event("message").data(data))
    });

    Sse::new(handshake.chain(messages)).keep_alive(KeepAlive::default())
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: String,
}

async fn post_message(
    State(state): State<SseState>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> (StatusCode, &'static str) {
    let tx = state
        .sessions
        .read()
        .expect("session map poisoned")
        .get(&query.session_id)
        .cloned();
    let Some(tx) = tx else {
        warn!(session = %query.session_id, "message for unknown session");
        return (StatusCode::NOT_FOUND, "unknown session");
    };

    let response = match serde_json::from_str::<JsonRpcRequest>(&body) {
        Ok(request) => state.server.handle_request(request).await,
        Err(err) => JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {err}")),
    };

    if tx.send(response).await.is_err() {
        state
            .sessions
            .write()
            .expect("session map poisoned")
            .remove(&query.session_id);
        return (StatusCode::GONE, "session closed");
    }
    (StatusCode::ACCEPTED, "Accepted")
}

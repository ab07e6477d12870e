//! Test utilities for smartdesk-core
//!
//! A mock OpenAI-compatible server for exercising the real HTTP backend in
//! integration tests. Replies are picked from the system prompt the same way
//! `MockBackend` picks them.

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use crate::ai::canned_reply;

#[derive(Clone, Default)]
struct ServerState {
    failing: bool,
    received: Arc<Mutex<Vec<Value>>>,
}

/// Mock OpenAI-compatible server for testing and development
pub struct MockOpenAIServer {
    addr: SocketAddr,
    state: ServerState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOpenAIServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        Self::spawn(ServerState::default()).await
    }

    /// Start a server whose completions endpoint always answers 500
    pub async fn start_failing() -> Self {
        Self::spawn(ServerState {
            failing: true,
            ..ServerState::default()
        })
        .await
    }

    async fn spawn(state: ServerState) -> Self {
        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Raw request bodies received on the completions endpoint
    pub fn received(&self) -> Vec<Value> {
        self.state
            .received
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOpenAIServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer ") && v.len() > 7)
}

/// Model list (health check)
async fn handle_models(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": {"message": "Missing key"}})));
    }
    (
        StatusCode::OK,
        Json(json!({"object": "list", "data": [{"id": "gpt-4o-mini", "object": "model"}]})),
    )
}

#[derive(Deserialize)]
struct CompletionRequest {
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct Message {
    role: String,
    content: Value,
}

/// Chat completions endpoint
async fn handle_chat(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": {"message": "Missing key"}})));
    }
    if let Ok(mut received) = state.received.lock() {
        received.push(body.clone());
    }
    if state.failing {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"message": "The server had an error"}})),
        );
    }

    let system = serde_json::from_value::<CompletionRequest>(body)
        .ok()
        .and_then(|req| {
            req.messages
                .into_iter()
                .find(|m| m.role == "system")
                .and_then(|m| m.content.as_str().map(str::to_string))
        })
        .unwrap_or_default();

    (
        StatusCode::OK,
        Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": canned_reply(&system)},
                "finish_reason": "stop"
            }]
        })),
    )
}

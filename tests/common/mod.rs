//! An in-process assistant service for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use axum::Router;
use axum::extract::{Json, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde_json::{Value, json};

use colloquy::AssistantClient;

/// Serve `app` on an ephemeral port and return its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A URL nothing is listening on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn client(base_url: &str) -> AssistantClient {
    AssistantClient::new(Some(base_url.to_string())).unwrap()
}

/// A well-behaved service that echoes messages back with their thread.
pub fn healthy_service() -> Router {
    async fn chat(Json(body): Json<Value>) -> Json<Value> {
        let message = body["message"].as_str().unwrap_or_default().to_string();
        let thread_id = body["thread_id"].as_str().unwrap_or("default").to_string();
        Json(json!({
            "response": format!("echo[{thread_id}]: {message}"),
            "thread_id": thread_id,
            "success": true,
        }))
    }

    async fn ask(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let message = params.get("message").cloned().unwrap_or_default();
        Json(json!({
            "response": format!("asked: {message}"),
            "thread_id": "default",
            "success": true,
        }))
    }

    async fn health() -> Json<Value> {
        Json(json!({"status": "healthy", "agent_initialized": true, "version": "1.0.0"}))
    }

    async fn ready() -> Json<Value> {
        Json(json!({"status": "ready", "agent_initialized": true, "version": "1.0.0"}))
    }

    Router::new()
        .route("/api/v1/chat", post(chat))
        .route("/api/v1/ask", post(ask))
        .route("/health", get(health))
        .route("/health/ready", get(ready))
}

/// A service whose every endpoint fails.
pub fn failing_service() -> Router {
    async fn chat() -> impl IntoResponse {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "Service unavailable", "success": false})),
        )
    }

    async fn ask() -> impl IntoResponse {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": [{"loc": ["query", "message"], "msg": "field required"}]})),
        )
    }

    async fn health() -> impl IntoResponse {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"detail": "starting up"})),
        )
    }

    async fn ready() -> impl IntoResponse {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    Router::new()
        .route("/api/v1/chat", post(chat))
        .route("/api/v1/ask", post(ask))
        .route("/health", get(health))
        .route("/health/ready", get(ready))
}

/// A service that answers with success statuses but malformed bodies.
pub fn garbled_service() -> Router {
    async fn chat() -> &'static str {
        "<html>definitely not json</html>"
    }

    async fn health() -> Json<Value> {
        Json(json!({"agent_initialized": true}))
    }

    async fn degraded() -> Json<Value> {
        Json(json!({"status": "degraded", "agent_initialized": false}))
    }

    async fn bad_gateway() -> impl IntoResponse {
        (
            StatusCode::BAD_GATEWAY,
            "<html><body><h1>502 Bad Gateway</h1></body></html>",
        )
    }

    Router::new()
        .route("/api/v1/chat", post(chat))
        .route("/api/v1/ask", post(bad_gateway))
        .route("/health", get(health))
        .route("/health/ready", get(degraded))
}

/// A service answering with the fewest fields it may send.
pub fn minimal_service() -> Router {
    async fn chat() -> impl IntoResponse {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"detail": "Agent not initialized", "success": null})),
        )
    }

    async fn health() -> Json<Value> {
        Json(json!({"status": "healthy"}))
    }

    async fn ready() -> Json<Value> {
        Json(json!({"status": "not_ready"}))
    }

    Router::new()
        .route("/api/v1/chat", post(chat))
        .route("/health", get(health))
        .route("/health/ready", get(ready))
}

/// A service that takes `delay` to answer each chat turn.
pub fn slow_service(delay: Duration) -> Router {
    Router::new().route(
        "/api/v1/chat",
        post(move |Json(body): Json<Value>| async move {
            tokio::time::sleep(delay).await;
            let message = body["message"].as_str().unwrap_or_default().to_string();
            Json(json!({
                "response": format!("late: {message}"),
                "thread_id": body["thread_id"],
                "success": true,
            }))
        }),
    )
}

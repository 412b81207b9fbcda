//! Front relay for the chat UI. Validates the request and forwards it to the
//! webhook server unchanged.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use reqwest::Client;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::models::ChatRequest;
use crate::server::cors_layer;

pub struct GatewayState {
    client: Client,
    webhook_url: String,
}

impl GatewayState {
    pub fn new(client: Client, webhook_url: impl Into<String>) -> Self {
        Self {
            client,
            webhook_url: webhook_url.into(),
        }
    }
}

pub fn router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

type GatewayResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn internal_error(body: Value) -> (StatusCode, Json<Value>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body))
}

async fn chat_handler(
    State(state): State<Arc<GatewayState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> GatewayResult {
    let Json(request) = payload.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": rejection.body_text() })),
        )
    })?;

    if request.message.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No message provided" })),
        ));
    }

    let response = state
        .client
        .post(&state.webhook_url)
        .json(&request)
        .send()
        .await
        .map_err(|e| {
            tracing::error!("Webhook request failed: {}", e);
            internal_error(json!({ "error": e.to_string() }))
        })?;

    if !response.status().is_success() {
        let status = response.status();
        let details = response.text().await.unwrap_or_default();
        tracing::error!("Webhook returned {}: {}", status, details);
        return Err(internal_error(json!({
            "error": "Webhook processing failed",
            "details": details,
        })));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| internal_error(json!({ "error": e.to_string() })))?;

    Ok(Json(body))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

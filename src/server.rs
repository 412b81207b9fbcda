use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::RelayError;
use crate::models::{ChatReply, ChatRequest, ErrorBody};
use crate::pipeline::RagPipeline;

pub struct AppState {
    pub pipeline: RagPipeline,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/webhook-test/invoke_n8n_agent", post(agent_webhook_handler))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

async fn run_pipeline(state: &AppState, request: ChatRequest) -> Result<ChatReply, RelayError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("chat", %request_id);

    let outcome = state.pipeline.run(request).instrument(span).await?;
    Ok(outcome.reply)
}

fn parse_request(
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<ChatRequest, RelayError> {
    payload
        .map(|Json(request)| request)
        .map_err(|rejection| RelayError::Validation(rejection.body_text()))
}

/// Direct API: errors are reported with a matching HTTP status.
async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, RelayError> {
    let request = parse_request(payload)?;

    let reply = run_pipeline(&state, request).await.map_err(|e| {
        tracing::error!("Error processing webhook: {}", e);
        e
    })?;

    Ok(Json(reply))
}

/// Automation-tool variant: always 200, outcome carried in `success`.
async fn agent_webhook_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Json<Value> {
    let result = match parse_request(payload) {
        Ok(request) => {
            tracing::info!(session_id = %request.session_id, "Received agent webhook");
            run_pipeline(&state, request).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(reply) => Json(json!({
            "response": reply.response,
            "session_id": reply.session_id,
            "success": true,
        })),
        Err(e) => {
            tracing::error!("Error processing agent webhook: {}", e);
            Json(json!({ "error": e.to_string(), "success": false }))
        }
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// chat-service-rs/src/routes.rs
//
// HTTP surface of the relay: chat endpoint, health check, and the
// telemetry diagnostic endpoint. The chat response is always written
// without waiting on the telemetry dispatch.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use telemetry_forwarder::{DispatchOutcome, EventContext, EventKind, TelemetryForwarder};
use tower_http::cors::{Any, CorsLayer};

use crate::llm_client::{ChatTurn, CompletionProvider};

const SYSTEM_PROMPT: &str = "You are a helpful AI assistant. Use the conversation history for \
     context and answer clearly and concisely.";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn CompletionProvider>,
    pub forwarder: TelemetryForwarder,
}

/// Chat request body (JSON)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<ChatTurn>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .route("/test-telemetry", post(test_telemetry_handler))
        .layer(cors)
        .with_state(state)
}

/// POST /chat - relay a message to the completion provider
async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();

    let message = match request.message.as_deref().filter(|m| !m.is_empty()) {
        Some(m) => m.to_string(),
        None => {
            // No telemetry event for rejected input
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Message is required" })),
            )
                .into_response();
        }
    };

    log::info!(
        "Chat request {}: {} prior turns",
        request_id,
        request.conversation_history.len()
    );

    match state
        .provider
        .complete(SYSTEM_PROMPT, &request.conversation_history, &message)
        .await
    {
        Ok(text) => {
            state.forwarder.send(
                EventKind::ChatRequest,
                EventContext {
                    request_id: Some(request_id),
                    user_message: Some(message),
                    ai_response: Some(text.clone()),
                    conversation_length: Some(request.conversation_history.len()),
                    processing_time_ms: Some(started.elapsed().as_millis() as u64),
                    model: Some(state.provider.model().to_string()),
                    ..Default::default()
                },
            );
            (StatusCode::OK, Json(json!({ "response": text }))).into_response()
        }
        Err(err) => {
            log::error!("Completion provider call failed: {}", err);
            state.forwarder.send(
                EventKind::ChatError,
                EventContext {
                    request_id: Some(request_id),
                    user_message: Some(message),
                    processing_time_ms: Some(started.elapsed().as_millis() as u64),
                    error_message: Some(err.to_string()),
                    ..Default::default()
                },
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to get response from completion provider",
                    "details": err.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// GET /health - liveness check
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// POST /test-telemetry - send a synthetic event and report the result.
/// Unlike the chat path this awaits the dispatch, so operators see the
/// real delivery outcome.
async fn test_telemetry_handler(State(state): State<AppState>) -> impl IntoResponse {
    let event = state
        .forwarder
        .build_event(EventKind::Test, EventContext::default());

    let config = state.forwarder.config();
    let config_json = json!({
        "enabled": config.enabled,
        "urlSet": config.url.is_some(),
    });

    match state.forwarder.forward(event).await {
        None => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Telemetry disabled or unconfigured; no event sent",
                "config": config_json,
            })),
        ),
        Some(DispatchOutcome::Delivered { status_code, ok, .. }) => {
            let message = if ok {
                "Test event sent to collector".to_string()
            } else {
                format!("Collector rejected test event with status {}", status_code)
            };
            (
                StatusCode::OK,
                Json(json!({
                    "success": ok,
                    "message": message,
                    "config": config_json,
                })),
            )
        }
        Some(DispatchOutcome::Failed {
            reason,
            classification,
        }) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "message": format!("Delivery failed [{}]: {}", classification, reason),
                "config": config_json,
            })),
        ),
    }
}

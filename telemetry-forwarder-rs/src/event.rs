// telemetry-forwarder-rs/src/event.rs
//
// Event Builder: constructs one structured telemetry record per
// transaction. Construction never fails; missing context values are
// coerced to placeholders instead of being dropped, so the field set
// for a given event type is always complete on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Logical event type, tags which optional fields are populated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ChatRequest,
    ChatError,
    Test,
}

/// Transaction outcome as recorded in the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Success,
    Error,
    Test,
}

/// Context bag collected by the request handler
///
/// Everything is optional; the builder substitutes safe defaults for
/// whatever the caller could not supply.
#[derive(Debug, Clone, Default)]
pub struct EventContext {
    pub request_id: Option<String>,
    pub user_message: Option<String>,
    pub ai_response: Option<String>,
    pub conversation_length: Option<usize>,
    pub processing_time_ms: Option<u64>,
    pub model: Option<String>,
    pub error_message: Option<String>,
}

/// One telemetry record, created fresh per transaction and never
/// mutated after construction
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    #[serde(rename = "_raw")]
    pub raw: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: EventKind,
    pub source: String,
    pub host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl TelemetryEvent {
    /// Build an event of the given kind, stamping the timestamp at call
    /// time. `host` falls back to the fixed literal when empty.
    pub fn build(kind: EventKind, ctx: EventContext, host: &str) -> Self {
        let host = if host.is_empty() {
            config_rs::DEFAULT_HOST_ID.to_string()
        } else {
            host.to_string()
        };

        let source = match kind {
            EventKind::Test => "test-endpoint",
            _ => "chat-api",
        };

        let base = Self {
            raw: String::new(),
            timestamp: Utc::now(),
            event_type: kind,
            source: source.to_string(),
            host,
            request_id: None,
            user_message: None,
            ai_response: None,
            conversation_length: None,
            processing_time_ms: None,
            model: None,
            status: None,
            error_message: None,
        };

        match kind {
            EventKind::ChatRequest => Self {
                raw: "Chat request processed successfully".to_string(),
                request_id: Some(ctx.request_id.unwrap_or_else(|| "unknown".to_string())),
                user_message: Some(ctx.user_message.unwrap_or_else(|| "unknown".to_string())),
                ai_response: Some(ctx.ai_response.unwrap_or_default()),
                conversation_length: Some(ctx.conversation_length.unwrap_or(0)),
                processing_time_ms: Some(ctx.processing_time_ms.unwrap_or(0)),
                model: Some(ctx.model.unwrap_or_else(|| "unknown".to_string())),
                status: Some(EventStatus::Success),
                ..base
            },
            EventKind::ChatError => {
                let error_message = ctx.error_message.unwrap_or_else(|| "unknown".to_string());
                Self {
                    raw: format!("Chat request failed: {}", error_message),
                    request_id: Some(ctx.request_id.unwrap_or_else(|| "unknown".to_string())),
                    user_message: Some(ctx.user_message.unwrap_or_else(|| "unknown".to_string())),
                    processing_time_ms: Some(ctx.processing_time_ms.unwrap_or(0)),
                    status: Some(EventStatus::Error),
                    error_message: Some(error_message),
                    ..base
                }
            }
            EventKind::Test => Self {
                raw: "Test event from relay deployment".to_string(),
                status: Some(EventStatus::Test),
                ..base
            },
        }
    }
}

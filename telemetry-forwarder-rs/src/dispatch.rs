// telemetry-forwarder-rs/src/dispatch.rs
//
// Dispatcher: one outbound POST per event, racing the full exchange
// against a bounded timeout. Exactly one outcome per call; no retries.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};

use crate::classify::FailureClass;
use crate::event::TelemetryEvent;
use crate::target::TransportTarget;

/// Terminal result of one dispatch attempt
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Delivered {
        status_code: u16,
        status_text: String,
        body: String,
        ok: bool,
    },
    Failed {
        reason: String,
        classification: FailureClass,
    },
}

impl DispatchOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered { ok: true, .. })
    }
}

/// Serialize the event and POST it to the resolved target.
///
/// The send and the full body read race `timeout`; when the deadline
/// elapses the in-flight future is dropped, which tears down the
/// underlying connection.
pub async fn dispatch(
    client: &reqwest::Client,
    target: &TransportTarget,
    event: &TelemetryEvent,
    timeout: Duration,
) -> DispatchOutcome {
    let body = match serde_json::to_string(event) {
        Ok(body) => body,
        Err(err) => {
            return DispatchOutcome::Failed {
                reason: format!("failed to serialize event: {}", err),
                classification: FailureClass::Other,
            }
        }
    };

    let mut request = client
        .post(target.request_url())
        .header(CONTENT_TYPE, "application/json")
        .header(CONTENT_LENGTH, body.len())
        .body(body);

    if let Some(token) = &target.auth_token {
        request = request.header(AUTHORIZATION, format!("Bearer {}", token));
    }

    let exchange = async {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok::<_, reqwest::Error>((status, body))
    };

    match tokio::time::timeout(timeout, exchange).await {
        Ok(Ok((status, body))) => DispatchOutcome::Delivered {
            status_code: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            body,
            ok: status.is_success(),
        },
        Ok(Err(err)) => DispatchOutcome::Failed {
            reason: error_chain(&err),
            classification: FailureClass::from_error(&err),
        },
        Err(_) => DispatchOutcome::Failed {
            reason: format!("timeout after {}s", timeout.as_secs()),
            classification: FailureClass::Timeout,
        },
    }
}

/// Flatten an error and its cause chain into one log-friendly line
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

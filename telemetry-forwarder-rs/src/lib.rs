//! # Telemetry Forwarder
//!
//! Best-effort delivery of structured transaction events to an
//! operator-configured collector endpoint. Send once, log locally on
//! failure: no retries, no queueing, no delivery guarantee. Failures in
//! this crate are never allowed to reach the chat-serving path.

mod classify;
mod dispatch;
mod event;
mod target;

pub use classify::FailureClass;
pub use dispatch::{dispatch, DispatchOutcome};
pub use event::{EventContext, EventKind, EventStatus, TelemetryEvent};
pub use target::{Transport, TransportTarget};

use std::time::Duration;

use config_rs::TelemetryConfig;

#[derive(Debug, thiserror::Error)]
pub enum ForwarderError {
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Fire-and-forget caller tying the subsystem together: builds events,
/// resolves the transport target per dispatch, and launches deliveries
/// that the request path never waits on.
///
/// Cheap to clone; the underlying HTTP client is shared.
#[derive(Clone)]
pub struct TelemetryForwarder {
    config: TelemetryConfig,
    host: String,
    client: reqwest::Client,
}

impl TelemetryForwarder {
    pub fn new(config: TelemetryConfig, host: impl Into<String>) -> Self {
        // Per-dispatch deadlines are enforced in dispatch(); the client
        // itself carries no global timeout.
        Self {
            config,
            host: host.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    /// Build an event stamped with this forwarder's host identifier
    pub fn build_event(&self, kind: EventKind, ctx: EventContext) -> TelemetryEvent {
        TelemetryEvent::build(kind, ctx, &self.host)
    }

    /// Attempt one delivery and report the outcome.
    ///
    /// Returns `None` without any network I/O when forwarding is
    /// disabled or no destination is configured. A destination that
    /// fails to resolve is logged and skipped; the error is never
    /// surfaced to callers.
    pub async fn forward(&self, event: TelemetryEvent) -> Option<DispatchOutcome> {
        if !self.config.is_active() {
            log::debug!(
                "telemetry disabled or unconfigured, dropping {:?} event",
                event.event_type
            );
            return None;
        }
        let url = self.config.url.as_deref()?;

        let target = match TransportTarget::resolve(url, self.config.auth_token.as_deref()) {
            Ok(target) => target,
            Err(err) => {
                log::error!("telemetry destination rejected: {}", err);
                return None;
            }
        };

        let outcome = dispatch(
            &self.client,
            &target,
            &event,
            Duration::from_secs(self.config.timeout_secs),
        )
        .await;

        match &outcome {
            DispatchOutcome::Delivered {
                status_code,
                status_text,
                ok,
                ..
            } => {
                if *ok {
                    log::debug!("telemetry event delivered ({})", status_code);
                } else {
                    log::error!(
                        "collector rejected telemetry event: {} {}",
                        status_code,
                        status_text
                    );
                }
            }
            DispatchOutcome::Failed {
                reason,
                classification,
            } => {
                log::warn!("telemetry delivery failed [{}]: {}", classification, reason);
            }
        }

        Some(outcome)
    }

    /// Launch a delivery without blocking the caller. The spawned task
    /// owns the dispatch; its outcome is logged in `forward` and then
    /// discarded.
    pub fn forward_in_background(&self, event: TelemetryEvent) {
        if !self.config.is_active() {
            return;
        }
        let forwarder = self.clone();
        tokio::spawn(async move {
            let _ = forwarder.forward(event).await;
        });
    }

    /// Build and launch in one step; the usual entry point for the
    /// request handlers.
    pub fn send(&self, kind: EventKind, ctx: EventContext) {
        let event = self.build_event(kind, ctx);
        self.forward_in_background(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn config(url: Option<&str>, enabled: bool) -> TelemetryConfig {
        TelemetryConfig {
            url: url.map(str::to_string),
            auth_token: None,
            enabled,
            timeout_secs: 1,
        }
    }

    #[tokio::test]
    async fn test_disabled_forward_is_an_immediate_noop() {
        let forwarder =
            TelemetryForwarder::new(config(Some("http://127.0.0.1:1/events"), false), "h");
        let event = forwarder.build_event(EventKind::Test, EventContext::default());

        let started = Instant::now();
        let outcome = forwarder.forward(event).await;
        assert!(outcome.is_none());
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_missing_destination_skips_dispatch() {
        let forwarder = TelemetryForwarder::new(config(None, true), "h");
        let event = forwarder.build_event(EventKind::Test, EventContext::default());
        assert!(forwarder.forward(event).await.is_none());
    }

    #[tokio::test]
    async fn test_unresolvable_destination_is_swallowed() {
        let forwarder = TelemetryForwarder::new(config(Some("not a url"), true), "h");
        let event = forwarder.build_event(EventKind::Test, EventContext::default());
        assert!(forwarder.forward(event).await.is_none());
    }

    #[tokio::test]
    async fn test_forward_in_background_returns_immediately() {
        // Destination accepts connections but never answers; the caller
        // must not be held up by it.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hold = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let forwarder = TelemetryForwarder::new(
            config(Some(&format!("http://{}/events", addr)), true),
            "h",
        );
        let started = Instant::now();
        forwarder.send(EventKind::Test, EventContext::default());
        assert!(started.elapsed() < Duration::from_millis(100));
        hold.abort();
    }

    #[test]
    fn test_event_host_comes_from_forwarder() {
        let forwarder = TelemetryForwarder::new(config(None, true), "relay-7");
        let event = forwarder.build_event(EventKind::Test, EventContext::default());
        assert_eq!(event.host, "relay-7");
    }
}

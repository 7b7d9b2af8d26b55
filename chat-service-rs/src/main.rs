// chat-service-rs/src/main.rs
// Chat relay service - HTTP entry point
//
// Accepts a chat message plus conversation history, forwards it to the
// completion provider, and emits a telemetry event per transaction to
// the configured collector without blocking the client response.

mod llm_client;
mod routes;

use std::sync::Arc;

use config_rs::RelayConfig;
use telemetry_forwarder::TelemetryForwarder;

use llm_client::OpenAiClient;
use routes::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = RelayConfig::from_env();
    log::info!("Telemetry configuration: {}", config.telemetry_summary());
    if config.provider.api_key.is_none() {
        log::warn!("LLM_API_KEY is not set; chat requests will fail until it is configured");
    }

    let provider = Arc::new(OpenAiClient::new(config.provider.clone()));
    let forwarder = TelemetryForwarder::new(config.telemetry.clone(), config.host.clone());

    let app = build_router(AppState {
        provider,
        forwarder,
    });

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Chat relay listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

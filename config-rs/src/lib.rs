//! config-rs/lib.rs
//! Shared configuration for the chat relay service.
//! Read once from the environment at process start; every component
//! receives an immutable copy instead of reading ambient state.

use std::env;
use std::net::SocketAddr;

/// Default listening port for the relay service
pub const DEFAULT_PORT: u16 = 3001;

/// Host identifier stamped into telemetry events when HOSTNAME is unset
pub const DEFAULT_HOST_ID: &str = "chat-relay";

/// Default outbound dispatch timeout in seconds
pub const DEFAULT_TELEMETRY_TIMEOUT_SECS: u64 = 10;

/// Telemetry forwarding configuration
///
/// The destination URL is operator-supplied and may point at arbitrary
/// ports and protocols (collector endpoints often listen on custom
/// ports such as 20001 or 10080). No URL means forwarding is skipped.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub url: Option<String>,
    pub auth_token: Option<String>,
    pub enabled: bool,
    pub timeout_secs: u64,
}

impl TelemetryConfig {
    pub fn from_env() -> Self {
        let url = env::var("TELEMETRY_URL").ok().filter(|v| !v.is_empty());
        let auth_token = env::var("TELEMETRY_AUTH_TOKEN")
            .ok()
            .filter(|v| !v.is_empty());

        // Enabled unless explicitly turned off
        let enabled = env::var("TELEMETRY_ENABLED")
            .map(|v| v != "false")
            .unwrap_or(true);

        let timeout_secs = env::var("TELEMETRY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TELEMETRY_TIMEOUT_SECS)
            .clamp(1, 60);

        Self {
            url,
            auth_token,
            enabled,
            timeout_secs,
        }
    }

    /// True when a dispatch should actually be attempted
    pub fn is_active(&self) -> bool {
        self.enabled && self.url.is_some()
    }
}

/// Completion provider configuration (OpenAI-compatible endpoint)
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        let api_url = env::var("LLM_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string());
        let api_key = env::var("LLM_API_KEY").ok().filter(|v| !v.is_empty());
        let model = env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        Self {
            api_url,
            api_key,
            model,
        }
    }
}

/// Top-level relay configuration, constructed once in main
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub port: u16,
    pub host: String,
    pub telemetry: TelemetryConfig,
    pub provider: ProviderConfig,
}

impl RelayConfig {
    pub fn from_env() -> Self {
        let port = match env::var("PORT") {
            Ok(v) => v.parse::<u16>().unwrap_or_else(|_| {
                log::warn!("Invalid PORT value {:?}, using default {}", v, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            Err(_) => DEFAULT_PORT,
        };

        let host = env::var("HOSTNAME")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST_ID.to_string());

        Self {
            port,
            host,
            telemetry: TelemetryConfig::from_env(),
            provider: ProviderConfig::from_env(),
        }
    }

    /// Bind address for the HTTP listener
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// Startup summary safe for logs: never prints the token itself
    pub fn telemetry_summary(&self) -> String {
        format!(
            "enabled={} urlSet={} hasAuthToken={} timeoutSecs={}",
            self.telemetry.enabled,
            self.telemetry.url.is_some(),
            self.telemetry.auth_token.is_some(),
            self.telemetry.timeout_secs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test for the TELEMETRY_* keys; cargo runs tests in
    // parallel and these share process-wide environment state.
    #[test]
    fn test_telemetry_from_env() {
        env::remove_var("TELEMETRY_ENABLED");
        env::remove_var("TELEMETRY_URL");
        env::remove_var("TELEMETRY_TIMEOUT_SECS");
        let config = TelemetryConfig::from_env();
        assert!(config.enabled);
        // No URL means no dispatch even while enabled
        assert!(!config.is_active());
        assert_eq!(config.timeout_secs, DEFAULT_TELEMETRY_TIMEOUT_SECS);

        // Only the literal "false" turns forwarding off
        env::set_var("TELEMETRY_ENABLED", "false");
        assert!(!TelemetryConfig::from_env().enabled);
        env::set_var("TELEMETRY_ENABLED", "0");
        assert!(TelemetryConfig::from_env().enabled);
        env::remove_var("TELEMETRY_ENABLED");

        env::set_var("TELEMETRY_URL", "http://collector:20001/in");
        assert!(TelemetryConfig::from_env().is_active());
        env::remove_var("TELEMETRY_URL");

        // Timeout is clamped and falls back on garbage
        env::set_var("TELEMETRY_TIMEOUT_SECS", "600");
        assert_eq!(TelemetryConfig::from_env().timeout_secs, 60);
        env::set_var("TELEMETRY_TIMEOUT_SECS", "not-a-number");
        assert_eq!(
            TelemetryConfig::from_env().timeout_secs,
            DEFAULT_TELEMETRY_TIMEOUT_SECS
        );
        env::remove_var("TELEMETRY_TIMEOUT_SECS");
    }

    #[test]
    fn test_provider_defaults() {
        env::remove_var("LLM_API_URL");
        env::remove_var("LLM_MODEL");
        let config = ProviderConfig::from_env();
        assert_eq!(config.api_url, "https://api.openai.com/v1/chat/completions");
        assert_eq!(config.model, "gpt-4o-mini");
    }
}

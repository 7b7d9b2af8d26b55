// chat-service-rs/src/llm_client.rs
//
// HTTP client for the chat completion provider (OpenAI-compatible API)
//
// The relay treats the provider as an opaque capability: one call per
// chat request, no retries. Configuration comes from ProviderConfig,
// read once at startup.

use async_trait::async_trait;
use config_rs::ProviderConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// One prior turn of the conversation, as the frontend sends it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub text: String,
    pub sender: Sender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider API key is not configured")]
    Unconfigured,
    #[error("network error: {0}")]
    Network(String),
    #[error("provider returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("parse error: {0}")]
    Parse(String),
}

/// Seam for the completion call so the HTTP surface can be exercised
/// without a live provider
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, ProviderError>;

    fn model(&self) -> &str;
}

pub struct OpenAiClient {
    client: Client,
    config: ProviderConfig,
}

impl OpenAiClient {
    pub fn new(config: ProviderConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    fn build_messages(
        system_prompt: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: system_prompt.to_string(),
        });
        for turn in history {
            messages.push(ChatMessage {
                role: match turn.sender {
                    Sender::User => "user".to_string(),
                    Sender::Ai => "assistant".to_string(),
                },
                content: turn.text.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: message.to_string(),
        });
        messages
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ProviderError::Unconfigured)?;

        let request_body = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: Self::build_messages(system_prompt, history, message),
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|err| ProviderError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let data: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::Parse(err.to_string()))?;

        data.choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| ProviderError::Parse("no choices returned in response".to_string()))
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

//! Chat-completion client boundary
//!
//! Every LLM interaction in the portal goes through the `LlmClient` trait:
//! routing, chain-of-thought reasoning, project extraction and response
//! phrasing. Uses a long-lived reqwest::Client for connection pooling.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{error, info};

use crate::error::PortalError;
use crate::Result;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Message role in a chat exchange
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Trait for the chat-completion operation.
///
/// Callers must tolerate responses that are not valid JSON even when JSON was
/// requested; each call site applies its own fallback policy.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String>;
}

/// Reusable chat-completion client (connection-pooled)
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let mut client = Self::new(api_key);
        client.base_url = base_url;
        client
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(PortalError::LlmError(
                "OPENAI_API_KEY not configured".to_string(),
            ));
        }

        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
        };

        info!(model, "Calling chat completion API");

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Chat completion request failed: {}", e);
                PortalError::LlmError(format!("Chat completion request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Chat completion API error response: {}", error_text);
            return Err(PortalError::LlmError(format!(
                "Chat completion API error: {}",
                error_text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!("Failed to parse chat completion response: {}", e);
            PortalError::LlmError(format!("Chat completion parse error: {}", e))
        })?;

        let answer = completion
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| {
                PortalError::LlmError("No choices in chat completion response".to_string())
            })?;

        Ok(answer)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// Scripted client for development & testing.
/// Keeps the portal exercisable without a live LLM dependency: it replays
/// queued responses in order and fails once the script is exhausted, which
/// doubles as call-failure injection for the fallback paths.
pub struct ScriptedClient {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, _model: &str, _messages: &[ChatMessage]) -> Result<String> {
        let mut responses = self
            .responses
            .lock()
            .map_err(|_| PortalError::LlmError("Scripted client poisoned".to_string()))?;

        responses
            .pop_front()
            .ok_or_else(|| PortalError::LlmError("Scripted client exhausted".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = ChatCompletionRequest {
            model: "gpt-4.1-2025-04-14".to_string(),
            messages: vec![
                ChatMessage::system("You are a router assistant."),
                ChatMessage::user("I spent $40 on groceries"),
            ],
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"role\":\"system\""));
        assert!(json.contains("I spent $40 on groceries"));
    }

    #[test]
    fn test_response_deserialization() {
        let payload = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "spend"}}
            ]
        }"#;

        let parsed: ChatCompletionResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(parsed.choices[0].message.content, "spend");
    }

    #[tokio::test]
    async fn test_scripted_client_replays_then_fails() {
        let client = ScriptedClient::new(vec!["first", "second"]);

        let first = client.complete("m", &[]).await.unwrap();
        let second = client.complete("m", &[]).await.unwrap();
        assert_eq!(first, "first");
        assert_eq!(second, "second");

        assert!(client.complete("m", &[]).await.is_err());
    }
}

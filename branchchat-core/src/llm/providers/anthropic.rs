//! Anthropic (Claude) LLM provider implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::DEFAULT_MODEL;
use crate::error::{BranchChatError, Result};
use crate::llm::{LLMProvider, LLMRequest, LLMResponse, Message, MessageRole, ModelInfo};

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Anthropic (Claude) LLM provider.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Anthropic API key
    /// * `model` - Model name (e.g., "claude-sonnet-4-5")
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    /// Create with a custom base URL.
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    /// Create from environment variables.
    ///
    /// Reads from:
    /// - `ANTHROPIC_API_KEY` - API key (required)
    /// - `ANTHROPIC_MODEL` - Model name (optional, defaults to [`DEFAULT_MODEL`])
    /// - `ANTHROPIC_BASE_URL` - Custom base URL (optional)
    ///
    /// # Errors
    ///
    /// Returns an error if ANTHROPIC_API_KEY is unset or blank.
    pub fn from_env(model: Option<impl Into<String>>) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                BranchChatError::Configuration(
                    "Missing ANTHROPIC_API_KEY in environment or configuration".to_string(),
                )
            })?;

        let model = model
            .map(|m| m.into())
            .or_else(|| std::env::var("ANTHROPIC_MODEL").ok().filter(|m| !m.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let base_url =
            std::env::var("ANTHROPIC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self::with_base_url(api_key, model, base_url))
    }

    /// Replace the endpoint chosen at construction.
    pub fn override_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Apply a per-request timeout to the underlying HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                BranchChatError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(self)
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Anthropic API request format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

/// Anthropic API response format
#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

/// Anthropic error response
#[derive(Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

#[derive(Deserialize)]
struct AnthropicErrorDetail {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

/// Convert messages to Anthropic format, extracting system prompts.
///
/// Multiple system messages are joined; Anthropic accepts a single `system` field.
fn convert_messages(messages: &[Message]) -> (Option<String>, Vec<AnthropicMessage>) {
    let mut system_parts = Vec::new();
    let mut anthropic_messages = Vec::new();

    for msg in messages {
        match msg.role {
            MessageRole::System => system_parts.push(msg.content.clone()),
            MessageRole::User => anthropic_messages.push(AnthropicMessage {
                role: "user",
                content: msg.content.clone(),
            }),
            MessageRole::Assistant => anthropic_messages.push(AnthropicMessage {
                role: "assistant",
                content: msg.content.clone(),
            }),
        }
    }

    let system = if system_parts.is_empty() {
        None
    } else {
        Some(system_parts.join("\n\n"))
    };

    (system, anthropic_messages)
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse> {
        let (system, messages) = convert_messages(&request.messages);

        let anthropic_request = AnthropicRequest {
            model: self.model.clone(),
            messages,
            system,
            max_tokens: request.max_tokens.unwrap_or(1024),
            temperature: request.temperature,
        };

        let url = format!("{}/messages", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&anthropic_request)
            .send()
            .await
            .map_err(|e| {
                BranchChatError::Backend(format!("Failed to send request to Anthropic: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if let Ok(error) = serde_json::from_str::<AnthropicError>(&text) {
                return Err(BranchChatError::Backend(format!(
                    "Anthropic API error ({}): {}",
                    error.error.error_type, error.error.message
                )));
            }

            return Err(BranchChatError::Backend(format!(
                "Anthropic API error ({}): {}",
                status, text
            )));
        }

        let anthropic_response: AnthropicResponse = response.json().await.map_err(|e| {
            BranchChatError::Backend(format!("Failed to parse Anthropic response: {}", e))
        })?;

        let content = anthropic_response
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .filter_map(|c| c.text.as_deref())
            .collect::<String>();

        Ok(LLMResponse { content })
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "anthropic".to_string(),
            model_name: self.model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anthropic_provider_creation() {
        let provider = AnthropicProvider::new("test-key", "claude-sonnet-4-5");
        assert_eq!(provider.model(), "claude-sonnet-4-5");
        assert_eq!(provider.base_url(), "https://api.anthropic.com/v1");
    }

    #[test]
    fn test_anthropic_provider_custom_base_url() {
        let provider =
            AnthropicProvider::with_base_url("test-key", "claude-x", "https://proxy.internal");
        assert_eq!(provider.base_url(), "https://proxy.internal");

        let provider = provider.override_base_url("https://other.internal");
        assert_eq!(provider.base_url(), "https://other.internal");
        assert_eq!(provider.model(), "claude-x");
    }

    #[test]
    fn test_anthropic_from_env_fallbacks() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("ANTHROPIC_API_KEY", "test-key");
            jail.set_env("ANTHROPIC_MODEL", "env-model");
            jail.set_env("ANTHROPIC_BASE_URL", "http://127.0.0.1:9999");

            let provider = AnthropicProvider::from_env(None::<String>).unwrap();
            assert_eq!(provider.model(), "env-model");
            assert_eq!(provider.base_url(), "http://127.0.0.1:9999");

            let provider = AnthropicProvider::from_env(Some("override-model")).unwrap();
            assert_eq!(provider.model(), "override-model");
            Ok(())
        });
    }

    #[test]
    fn test_anthropic_from_env_missing_key() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("ANTHROPIC_API_KEY", "  ");
            let result = AnthropicProvider::from_env(None::<String>);
            assert!(matches!(result, Err(BranchChatError::Configuration(_))));
            Ok(())
        });
    }

    #[test]
    fn test_with_timeout_keeps_settings() {
        let provider = AnthropicProvider::new("test-key", "claude-x")
            .with_timeout(Duration::from_secs(3))
            .unwrap();
        assert_eq!(provider.model(), "claude-x");
    }

    #[test]
    fn test_convert_messages_with_system() {
        let messages = vec![
            Message::system("Be brief"),
            Message::user("Hello"),
            Message::assistant("Hi there!"),
            Message::system("Summarize"),
        ];

        let (system, converted) = convert_messages(&messages);

        assert_eq!(system.as_deref(), Some("Be brief\n\nSummarize"));
        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0].role, "user");
        assert_eq!(converted[1].role, "assistant");
    }

    #[test]
    fn test_convert_messages_without_system() {
        let (system, converted) = convert_messages(&[Message::user("Hello")]);
        assert!(system.is_none());
        assert_eq!(converted.len(), 1);
    }

    #[test]
    fn test_model_info() {
        let provider = AnthropicProvider::new("test-key", "claude-3-haiku-20240307");
        let info = provider.model_info();
        assert_eq!(info.provider, "anthropic");
        assert_eq!(info.model_name, "claude-3-haiku-20240307");
    }
}

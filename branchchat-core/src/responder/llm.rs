//! Responder backed by an [`LLMProvider`]

use async_trait::async_trait;
use std::sync::Arc;

use super::Responder;
use crate::config::ResponderConfig;
use crate::error::{BranchChatError, Result};
use crate::llm::{LLMProvider, LLMRequest, Message, MessageRole};

/// Instruction prepended to the transcript when asking for a summary
pub const DEFAULT_SUMMARY_PROMPT: &str = "Summarize the following conversation concisely, \
preserving key information, decisions, and context that would be important for continuing \
the conversation.";

/// Adapts an [`LLMProvider`] to the [`Responder`] capability
pub struct LlmResponder {
    provider: Arc<dyn LLMProvider>,
    max_tokens: usize,
    temperature: Option<f32>,
    summary_prompt: String,
}

impl LlmResponder {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            max_tokens: 1024,
            temperature: None,
            summary_prompt: DEFAULT_SUMMARY_PROMPT.to_string(),
        }
    }

    pub fn from_config(provider: Arc<dyn LLMProvider>, config: &ResponderConfig) -> Self {
        Self {
            provider,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            summary_prompt: config
                .summary_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SUMMARY_PROMPT.to_string()),
        }
    }

    pub fn with_summary_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.summary_prompt = prompt.into();
        self
    }

    fn summary_request(&self, messages: &[Message]) -> LLMRequest {
        let transcript = render_transcript(messages);
        let prompt = format!(
            "{}\n\n{}\n\nProvide a brief summary:",
            self.summary_prompt, transcript
        );

        LLMRequest::from_messages(vec![Message::user(prompt)])
            .with_temperature(0.3)
            .with_max_tokens(self.max_tokens)
    }

    async fn generate(&self, request: LLMRequest) -> Result<String> {
        let response = self
            .provider
            .generate_request(&request)
            .await
            .map_err(BranchChatError::into_backend)?;
        Ok(response.content.trim().to_string())
    }
}

/// Render a transcript as `Role: content` blocks
fn render_transcript(messages: &[Message]) -> String {
    if messages.is_empty() {
        return "(empty conversation)".to_string();
    }

    messages
        .iter()
        .map(|m| {
            let speaker = match m.role {
                MessageRole::System => "System",
                MessageRole::User => "User",
                MessageRole::Assistant => "Assistant",
            };
            format!("{}: {}", speaker, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl Responder for LlmResponder {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let mut request =
            LLMRequest::from_messages(messages.to_vec()).with_max_tokens(self.max_tokens);
        if let Some(t) = self.temperature {
            request = request.with_temperature(t);
        }
        self.generate(request).await
    }

    async fn summarize(&self, messages: &[Message]) -> Result<String> {
        self.generate(self.summary_request(messages)).await
    }

    fn name(&self) -> String {
        let info = self.provider.model_info();
        format!("{}:{}", info.provider, info.model_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LLMResponse, ModelInfo};
    use tokio::sync::Mutex;

    /// Provider that echoes the last message and records requests
    #[derive(Default)]
    struct EchoProvider {
        requests: Mutex<Vec<LLMRequest>>,
    }

    #[async_trait]
    impl LLMProvider for EchoProvider {
        async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse> {
            self.requests.lock().await.push(request.clone());
            let last = request
                .messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(LLMResponse {
                content: format!("  echo: {}  ", last),
            })
        }

        fn model_info(&self) -> ModelInfo {
            ModelInfo {
                provider: "echo".to_string(),
                model_name: "v1".to_string(),
            }
        }
    }

    struct BrokenProvider;

    #[async_trait]
    impl LLMProvider for BrokenProvider {
        async fn generate_request(&self, _request: &LLMRequest) -> Result<LLMResponse> {
            Err(BranchChatError::Configuration("no key".to_string()))
        }
    }

    #[tokio::test]
    async fn test_complete_passes_transcript_and_trims() {
        let provider = Arc::new(EchoProvider::default());
        let responder = LlmResponder::new(provider.clone());

        let reply = responder
            .complete(&[Message::user("first"), Message::assistant("ok"), Message::user("second")])
            .await
            .unwrap();
        assert_eq!(reply, "echo: second");

        let requests = provider.requests.lock().await;
        assert_eq!(requests[0].messages.len(), 3);
        assert_eq!(requests[0].max_tokens, Some(1024));
        assert_eq!(responder.name(), "echo:v1");
    }

    #[tokio::test]
    async fn test_summarize_embeds_transcript_in_prompt() {
        let provider = Arc::new(EchoProvider::default());
        let responder = LlmResponder::new(provider.clone()).with_summary_prompt("Condense:");

        responder
            .summarize(&[Message::user("What is QAOA?"), Message::assistant("An algorithm.")])
            .await
            .unwrap();

        let requests = provider.requests.lock().await;
        let prompt = &requests[0].messages[0].content;
        assert_eq!(requests[0].messages.len(), 1);
        assert!(prompt.starts_with("Condense:"));
        assert!(prompt.contains("User: What is QAOA?"));
        assert!(prompt.contains("Assistant: An algorithm."));
        assert_eq!(requests[0].temperature, Some(0.3));
    }

    #[tokio::test]
    async fn test_provider_errors_become_backend_errors() {
        let responder = LlmResponder::new(Arc::new(BrokenProvider));
        let err = responder.complete(&[]).await.unwrap_err();
        assert!(matches!(err, BranchChatError::Backend(_)));
    }

    #[test]
    fn test_render_empty_transcript() {
        assert_eq!(render_transcript(&[]), "(empty conversation)");
    }
}

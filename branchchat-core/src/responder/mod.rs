//! Responder capability
//!
//! The conversation graph never talks to an LLM directly. It asks a
//! [`Responder`] for the next assistant turn (`complete`) or for a condensed
//! version of a transcript (`summarize`). Two implementations ship with the
//! crate:
//!
//! - [`LlmResponder`]: adapts any [`LLMProvider`](crate::llm::LLMProvider)
//! - [`StubResponder`]: deterministic canned replies for tests and offline use
//!
//! # Example
//!
//! ```rust,ignore
//! use branchchat_core::responder::{Responder, StubResponder};
//!
//! let responder = StubResponder::new("canned");
//! let reply = responder.complete(&[Message::user("hi")]).await?;
//! assert_eq!(reply, "canned");
//! ```

mod llm;
mod stub;

pub use llm::{DEFAULT_SUMMARY_PROMPT, LlmResponder};
pub use stub::{StubCall, StubResponder};

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{ResponderConfig, ResponderProvider};
use crate::error::Result;
use crate::llm::{LLMProviderFactory, Message};

/// Text-generation capability injected into the conversation graph.
///
/// Implementations report every failure as
/// [`BranchChatError::Backend`](crate::error::BranchChatError::Backend).
#[async_trait]
pub trait Responder: Send + Sync {
    /// Produce the next assistant turn for a full (root-to-node) transcript
    async fn complete(&self, messages: &[Message]) -> Result<String>;

    /// Produce a concise summary of a full transcript
    async fn summarize(&self, messages: &[Message]) -> Result<String>;

    /// Human-readable name, used in logs
    fn name(&self) -> String {
        "responder".to_string()
    }
}

/// Factory for creating responders from configuration
pub struct ResponderFactory;

impl ResponderFactory {
    /// Create a responder from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a live backend cannot be created (e.g., missing API key).
    pub fn create(config: &ResponderConfig) -> Result<Arc<dyn Responder>> {
        match config.provider {
            ResponderProvider::Stub => Ok(Arc::new(StubResponder::new(config.stub_reply.clone()))),
            ResponderProvider::Anthropic => {
                let provider = LLMProviderFactory::create(config)?;
                Ok(Arc::new(LlmResponder::from_config(provider, config)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_factory_stub() {
        let config = ResponderConfig {
            stub_reply: "fixed".to_string(),
            ..ResponderConfig::stub()
        };
        let responder = ResponderFactory::create(&config).unwrap();
        assert_eq!(responder.name(), "stub");
        let reply = responder.complete(&[Message::user("hello")]).await.unwrap();
        assert_eq!(reply, "fixed");
    }
}

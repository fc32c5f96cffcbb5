//! Factory for creating LLM providers from configuration

use crate::config::{ResponderConfig, ResponderProvider};
use crate::error::{BranchChatError, Result};
use crate::llm::LLMProvider;
use std::sync::Arc;

#[cfg(feature = "llm-anthropic")]
use crate::llm::providers::anthropic::AnthropicProvider;

/// Factory for creating LLM providers
pub struct LLMProviderFactory;

impl LLMProviderFactory {
    /// Create an LLM provider from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be created (e.g., missing API key),
    /// or if the configured backend is not an LLM (the stub responder).
    pub fn create(config: &ResponderConfig) -> Result<Arc<dyn LLMProvider>> {
        match config.provider {
            #[cfg(feature = "llm-anthropic")]
            ResponderProvider::Anthropic => Ok(Arc::new(Self::anthropic(config)?)),

            #[cfg(not(feature = "llm-anthropic"))]
            ResponderProvider::Anthropic => Err(BranchChatError::Configuration(
                "Anthropic provider requires 'llm-anthropic' feature".to_string(),
            )),

            ResponderProvider::Stub => Err(BranchChatError::Configuration(
                "The stub responder is not backed by an LLM provider".to_string(),
            )),
        }
    }

    /// Build the Anthropic client.
    ///
    /// Each setting resolves configuration first, then the `ANTHROPIC_*`
    /// environment variables, then the built-in default.
    #[cfg(feature = "llm-anthropic")]
    fn anthropic(config: &ResponderConfig) -> Result<AnthropicProvider> {
        let model = non_empty(Some(config.model.clone()));

        let provider = match &config.api_key {
            Some(api_key) => {
                let model = model
                    .or_else(|| non_empty(std::env::var("ANTHROPIC_MODEL").ok()))
                    .unwrap_or_else(|| crate::config::DEFAULT_MODEL.to_string());
                AnthropicProvider::new(api_key.clone(), model)
            }
            None => AnthropicProvider::from_env(model)?,
        };

        let provider = match &config.base_url {
            Some(base_url) => provider.override_base_url(base_url.clone()),
            None => provider,
        };

        provider.with_timeout(config.timeout)
    }
}

#[cfg(feature = "llm-anthropic")]
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_has_no_llm_provider() {
        let result = LLMProviderFactory::create(&ResponderConfig::stub());
        assert!(matches!(result, Err(BranchChatError::Configuration(_))));
    }

    #[cfg(feature = "llm-anthropic")]
    #[test]
    fn test_anthropic_with_explicit_key() {
        let config = ResponderConfig {
            api_key: Some("test-key".to_string()),
            model: "claude-x".to_string(),
            ..Default::default()
        };
        let provider = LLMProviderFactory::create(&config).unwrap();
        let info = provider.model_info();
        assert_eq!(info.provider, "anthropic");
        assert_eq!(info.model_name, "claude-x");
    }

    #[cfg(feature = "llm-anthropic")]
    #[test]
    fn test_model_falls_back_to_env_then_default() {
        figment::Jail::expect_with(|jail| {
            let with_key = ResponderConfig {
                api_key: Some("test-key".to_string()),
                ..Default::default()
            };

            jail.set_env("ANTHROPIC_MODEL", "env-model");
            let provider = LLMProviderFactory::anthropic(&with_key).unwrap();
            assert_eq!(provider.model(), "env-model");

            jail.set_env("ANTHROPIC_API_KEY", "env-key");
            let provider = LLMProviderFactory::anthropic(&ResponderConfig::default()).unwrap();
            assert_eq!(provider.model(), "env-model");

            jail.set_env("ANTHROPIC_MODEL", "");
            let provider = LLMProviderFactory::anthropic(&with_key).unwrap();
            assert_eq!(provider.model(), crate::config::DEFAULT_MODEL);
            Ok(())
        });
    }

    #[cfg(feature = "llm-anthropic")]
    #[test]
    fn test_configured_base_url_beats_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("ANTHROPIC_API_KEY", "env-key");
            jail.set_env("ANTHROPIC_BASE_URL", "http://127.0.0.1:48271");

            let provider = LLMProviderFactory::anthropic(&ResponderConfig::default()).unwrap();
            assert_eq!(provider.base_url(), "http://127.0.0.1:48271");

            let config = ResponderConfig {
                base_url: Some("https://proxy.example".to_string()),
                ..Default::default()
            };
            let provider = LLMProviderFactory::anthropic(&config).unwrap();
            assert_eq!(provider.base_url(), "https://proxy.example");

            let config = ResponderConfig {
                api_key: Some("test-key".to_string()),
                ..config
            };
            let provider = LLMProviderFactory::anthropic(&config).unwrap();
            assert_eq!(provider.base_url(), "https://proxy.example");
            Ok(())
        });
    }
}

//! LLM provider implementations

#[cfg(feature = "llm-anthropic")]
pub mod anthropic;

#[cfg(feature = "llm-anthropic")]
pub use anthropic::AnthropicProvider;

//! Configuration types for branchchat

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{BranchChatError, Result};

/// Id of the root node created with every store
pub const DEFAULT_ROOT_ID: &str = "ROOT";

/// Default Anthropic model
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";

/// Reply returned by the stub responder unless configured otherwise
pub const DEFAULT_STUB_REPLY: &str = "<<AI Res>>";

/// Main configuration for branchchat
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchChatConfig {
    /// Id given to the root node at store initialization
    pub root_id: String,

    /// Responder (LLM backend) configuration
    pub responder: ResponderConfig,
}

impl Default for BranchChatConfig {
    fn default() -> Self {
        Self {
            root_id: DEFAULT_ROOT_ID.to_string(),
            responder: ResponderConfig::default(),
        }
    }
}

/// Responder backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponderProvider {
    /// Deterministic offline responder
    Stub,
    /// Anthropic Messages API
    #[default]
    Anthropic,
}

/// Responder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    /// Backend type
    pub provider: ResponderProvider,

    /// Model name; empty defers to `ANTHROPIC_MODEL`, then [`DEFAULT_MODEL`]
    pub model: String,

    /// API key (prefer `ANTHROPIC_API_KEY`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL for custom endpoints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Maximum tokens per reply
    pub max_tokens: usize,

    /// Sampling temperature (provider default when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Per-request timeout for live backends
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Fixed reply of the stub responder
    pub stub_reply: String,

    /// Instruction used when asking the backend for a summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_prompt: Option<String>,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            provider: ResponderProvider::default(),
            model: String::new(),
            api_key: None,
            base_url: None,
            max_tokens: 1024,
            temperature: None,
            timeout: Duration::from_secs(60),
            stub_reply: DEFAULT_STUB_REPLY.to_string(),
            summary_prompt: None,
        }
    }
}

impl ResponderConfig {
    /// Configuration for the offline stub responder
    pub fn stub() -> Self {
        Self {
            provider: ResponderProvider::Stub,
            ..Default::default()
        }
    }
}

impl BranchChatConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. `branchchat.toml` in the working directory
    /// 3. `BRANCHCHAT_` environment variables (`__` separates nested keys,
    ///    e.g. `BRANCHCHAT_RESPONDER__PROVIDER=stub`)
    /// 4. File named by `BRANCHCHAT_CONFIG_PATH`
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration source is invalid.
    pub fn load() -> Result<Self> {
        Self::load_with(None)
    }

    /// Same layering as [`load`](Self::load), with `path` merged last.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not exist or a source is invalid.
    pub fn load_with(path: Option<&Path>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Toml},
        };

        let mut figment = Figment::new()
            .merge(Toml::file("branchchat.toml"))
            .merge(
                Env::prefixed("BRANCHCHAT_")
                    .ignore(&["CONFIG_PATH"])
                    .split("__"),
            );

        if let Ok(env_path) = std::env::var("BRANCHCHAT_CONFIG_PATH") {
            figment = figment.merge(Toml::file(env_path));
        }

        if let Some(path) = path {
            ensure_exists(path)?;
            figment = figment.merge(Toml::file(path));
        }

        let config: BranchChatConfig = figment.extract().map_err(|e| {
            BranchChatError::Configuration(format!("Failed to load configuration: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Toml},
        };

        let path = path.as_ref();
        ensure_exists(path)?;

        let config: BranchChatConfig = Figment::new()
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| {
                BranchChatError::Configuration(format!(
                    "Failed to load configuration file: {}",
                    e
                ))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.root_id.trim().is_empty() {
            return Err(BranchChatError::Configuration(
                "root_id must not be empty".to_string(),
            ));
        }

        if self.responder.max_tokens == 0 {
            return Err(BranchChatError::Configuration(
                "responder.max_tokens must be greater than zero".to_string(),
            ));
        }

        if let Some(t) = self.responder.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(BranchChatError::Configuration(format!(
                    "responder.temperature must be within 0.0-2.0, got {}",
                    t
                )));
            }
        }

        Ok(())
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(BranchChatError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }
    Ok(())
}

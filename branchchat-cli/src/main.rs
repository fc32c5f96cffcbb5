//! BranchChat CLI - scripted demo and interactive session over a conversation tree

mod demo;
mod repl;

use anyhow::{Context, Result};
use branchchat_core::config::{BranchChatConfig, ResponderProvider};
use branchchat_core::graph::ConversationGraph;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "branchchat")]
#[command(about = "Branching conversations over an LLM backend", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file merged over every other source
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scripted branching session
    Demo {
        /// Use the offline stub responder
        #[arg(long)]
        stub: bool,
    },
    /// Interactive session
    Repl {
        /// Use the offline stub responder
        #[arg(long)]
        stub: bool,
    },
    /// Print the effective configuration as JSON
    Config,
    /// Version information
    Version,
}

fn load_config(path: Option<&Path>, stub: bool) -> Result<BranchChatConfig> {
    let mut config = BranchChatConfig::load_with(path).context("loading configuration")?;
    if stub {
        config.responder.provider = ResponderProvider::Stub;
    }
    Ok(config)
}

fn build_graph(config: &BranchChatConfig) -> Result<ConversationGraph> {
    let graph = ConversationGraph::from_config(config).context("creating responder")?;
    tracing::info!(
        root_id = %config.root_id,
        provider = ?config.responder.provider,
        "Conversation graph ready"
    );
    Ok(graph)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { stub } => {
            let config = load_config(cli.config.as_deref(), stub)?;
            let graph = build_graph(&config)?;
            demo::run(&graph).await?;
        }
        Commands::Repl { stub } => {
            let config = load_config(cli.config.as_deref(), stub)?;
            let graph = build_graph(&config)?;
            repl::run(&graph).await?;
        }
        Commands::Config => {
            let mut config = load_config(cli.config.as_deref(), false)?;
            if config.responder.api_key.is_some() {
                config.responder.api_key = Some("********".to_string());
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Version => {
            println!("branchchat {}", env!("CARGO_PKG_VERSION"));
            println!("branchchat-core {}", branchchat_core::VERSION);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_flag_is_optional_and_global() {
        let cli = Cli::try_parse_from(["branchchat", "demo", "--stub"]).unwrap();
        assert!(cli.config.is_none());

        let cli = Cli::try_parse_from(["branchchat", "repl", "--config", "a.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("a.toml")));
    }

    #[test]
    fn test_config_path_env_keeps_other_layers() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("a.toml", "root_id = \"FROM_FILE\"")?;
            jail.set_env("BRANCHCHAT_CONFIG_PATH", "a.toml");
            jail.set_env("BRANCHCHAT_RESPONDER__PROVIDER", "stub");

            let cli = Cli::try_parse_from(["branchchat", "config"]).unwrap();
            assert!(cli.config.is_none());

            let config = load_config(cli.config.as_deref(), false).unwrap();
            assert_eq!(config.root_id, "FROM_FILE");
            assert_eq!(config.responder.provider, ResponderProvider::Stub);
            Ok(())
        });
    }

    #[test]
    fn test_stub_flag_overrides_provider() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("b.toml", "[responder]\nprovider = \"anthropic\"")?;
            let config = load_config(Some(Path::new("b.toml")), true).unwrap();
            assert_eq!(config.responder.provider, ResponderProvider::Stub);
            Ok(())
        });
    }
}

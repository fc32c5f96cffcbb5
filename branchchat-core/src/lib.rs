//! # BranchChat - Branching conversations over an LLM backend
//!
//! BranchChat keeps a conversation as a tree instead of a single thread:
//! - Every node stores only its own turns; context is the root-to-node lineage
//! - Branches fork from any node, optionally carrying or presetting turns
//! - Branches merge back with a prefix-aware rule
//! - Any branch can be condensed into a summary sibling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use branchchat_core::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let graph = ConversationGraph::new(Arc::new(StubResponder::default()));
//!
//!     graph.chat("ROOT", "Explain quantum computing simply.").await?;
//!     let fork = graph
//!         .branch("ROOT", BranchOptions::new().with_seed("Tell me about QAOA."))
//!         .await?;
//!     graph.merge("ROOT", &fork.id).await?;
//!
//!     println!("{}", graph.render_tree().await);
//!     Ok(())
//! }
//! ```
//!
//! ## Backends
//!
//! The graph talks to a [`Responder`](responder::Responder). Live responders wrap an
//! [`LLMProvider`](llm::LLMProvider); the stub returns canned text.
//!
//! ## Feature Flags
//!
//! - `llm-anthropic` (default): Anthropic Messages API provider

pub mod config;
pub mod error;
pub mod graph;
pub mod llm;
pub mod responder;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{BranchChatConfig, ResponderConfig, ResponderProvider};
    pub use crate::error::{BranchChatError, Result};
    pub use crate::graph::{
        BranchOptions, BranchOutcome, ChatReply, ConversationGraph, MergeMode, MergeOutcome,
        NodeStore, NodeSummary, NodeView,
    };
    pub use crate::llm::{
        LLMProvider, LLMProviderFactory, LLMRequest, LLMResponse, Message, MessageRole,
    };
    pub use crate::responder::{LlmResponder, Responder, ResponderFactory, StubResponder};
}

//! Conversation graph
//!
//! A tree of conversation nodes, each holding only its own turns. The full
//! context of a node is the concatenation of its ancestors' transcripts,
//! root first, followed by its own.
//!
//! - [`NodeStore`]: id allocation, parent links, lineage traversal
//! - [`merge_transcripts`]: prefix-aware merge rule
//! - [`ConversationGraph`]: chat, branch, merge and summarize over a shared store

pub mod ids;
pub mod merge;
pub mod node;
pub mod service;
pub mod store;
pub mod transcript;

pub use ids::{BRANCH_PREFIX, SUMMARY_PREFIX, default_summary_id, next_free_id};
pub use merge::{MergeMode, merge_transcripts};
pub use node::{Node, NodeSummary, NodeView};
pub use service::{BranchOptions, BranchOutcome, ChatReply, ConversationGraph, MergeOutcome};
pub use store::NodeStore;
pub use transcript::Transcript;

//! Conversation graph: chat, branch, merge and summarize over a shared node store

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::ids::{SUMMARY_PREFIX, default_summary_id};
use super::merge::{MergeMode, merge_transcripts};
use super::node::{NodeSummary, NodeView};
use super::store::NodeStore;
use super::transcript::Transcript;
use crate::config::BranchChatConfig;
use crate::error::{BranchChatError, Result};
use crate::llm::Message;
use crate::responder::{Responder, ResponderFactory};

/// Options for [`ConversationGraph::branch`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchOptions {
    /// Explicit id; generated (`BRANCH-<n>`) when absent
    pub new_id: Option<String>,
    /// Copy the parent's own messages onto the new branch
    pub carry_messages: bool,
    /// Turns appended verbatim after any carried messages, without a completion
    pub preset_messages: Vec<Message>,
    /// First user turn; answered by the responder
    pub seed_message: Option<String>,
}

impl Default for BranchOptions {
    fn default() -> Self {
        Self {
            new_id: None,
            carry_messages: true,
            preset_messages: Vec::new(),
            seed_message: None,
        }
    }
}

impl BranchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.new_id = Some(id.into());
        self
    }

    pub fn carry_messages(mut self, carry: bool) -> Self {
        self.carry_messages = carry;
        self
    }

    pub fn with_preset(mut self, message: Message) -> Self {
        self.preset_messages.push(message);
        self
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed_message = Some(seed.into());
        self
    }

    fn validate(&self) -> Result<()> {
        if let Some(bad) = self.preset_messages.iter().find(|m| !Transcript::accepts(m)) {
            return Err(BranchChatError::InvalidArgument(format!(
                "preset messages must be user or assistant turns, got {}",
                bad.role
            )));
        }
        if let Some(seed) = &self.seed_message {
            ensure_not_blank(seed, "seed message")?;
        }
        Ok(())
    }
}

/// Result of [`ConversationGraph::chat`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    /// The node's own messages after the exchange
    pub messages: Vec<Message>,
}

/// Result of branch creation and summarization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchOutcome {
    pub id: String,
    pub messages: Vec<Message>,
}

/// Result of [`ConversationGraph::merge`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeOutcome {
    pub messages: Vec<Message>,
    pub mode: MergeMode,
}

fn ensure_not_blank(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BranchChatError::InvalidArgument(format!(
            "{} must not be empty",
            what
        )));
    }
    Ok(())
}

/// Tree of conversation branches backed by a [`Responder`].
///
/// Every store mutation happens under one write lock. Responder calls run
/// with no store lock held; their result is appended in a second, short
/// critical section.
pub struct ConversationGraph {
    store: RwLock<NodeStore>,
    responder: RwLock<Arc<dyn Responder>>,
}

impl ConversationGraph {
    /// Create a graph with a `ROOT` node
    pub fn new(responder: Arc<dyn Responder>) -> Self {
        Self::with_root(crate::config::DEFAULT_ROOT_ID, responder)
    }

    /// Create a graph whose root has a custom id
    pub fn with_root(root_id: impl Into<String>, responder: Arc<dyn Responder>) -> Self {
        Self {
            store: RwLock::new(NodeStore::new(root_id)),
            responder: RwLock::new(responder),
        }
    }

    /// Create a graph and its responder from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the responder cannot be built.
    pub fn from_config(config: &BranchChatConfig) -> Result<Self> {
        config.validate()?;
        let responder = ResponderFactory::create(&config.responder)?;
        Ok(Self::with_root(config.root_id.clone(), responder))
    }

    /// Swap the responder; in-flight calls finish on the previous one
    pub async fn set_responder(&self, responder: Arc<dyn Responder>) {
        let name = responder.name();
        *self.responder.write().await = responder;
        tracing::info!(responder = %name, "Responder replaced");
    }

    pub async fn responder_name(&self) -> String {
        self.responder.read().await.name()
    }

    async fn current_responder(&self) -> Arc<dyn Responder> {
        self.responder.read().await.clone()
    }

    pub async fn root_id(&self) -> String {
        self.store.read().await.root_id().to_string()
    }

    /// Every node with parent, children and message count
    pub async fn list_nodes(&self) -> Vec<NodeSummary> {
        self.store.read().await.list()
    }

    /// # Errors
    ///
    /// `NotFound` if the node does not exist.
    pub async fn get_node(&self, id: &str) -> Result<NodeView> {
        Ok(self.store.read().await.get(id)?.view())
    }

    /// Full root-to-node context of `id`
    pub async fn context(&self, id: &str) -> Result<Vec<Message>> {
        self.store.read().await.context(id)
    }

    pub async fn depth(&self, id: &str) -> Result<usize> {
        self.store.read().await.depth(id)
    }

    pub async fn render_tree(&self) -> String {
        self.store.read().await.render_tree()
    }

    /// Send a user turn to a node and append the responder's reply.
    ///
    /// The user turn is kept even when the responder fails, so a retry
    /// adds a second user turn.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidArgument` for a blank message, `Backend` on responder failure.
    pub async fn chat(&self, node_id: &str, message: &str) -> Result<ChatReply> {
        ensure_not_blank(message, "message")?;

        let context = {
            let mut store = self.store.write().await;
            store.append(node_id, Message::user(message))?;
            store.context(node_id)?
        };
        tracing::debug!(node_id = %node_id, context_len = context.len(), "Requesting completion");

        let reply = self.complete(node_id, &context).await?;

        let mut store = self.store.write().await;
        store.append(node_id, Message::assistant(reply.clone()))?;
        let messages = store.get(node_id)?.messages().to_vec();
        tracing::info!(node_id = %node_id, message_count = messages.len(), "Chat turn completed");

        Ok(ChatReply { reply, messages })
    }

    /// Create a child of `parent_id`.
    ///
    /// With a seed message the new node is created, the seed appended and then
    /// answered; a responder failure at that point leaves the node and its
    /// seed turn in place.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Conflict`, `InvalidArgument`, `Backend`.
    pub async fn branch(&self, parent_id: &str, options: BranchOptions) -> Result<BranchOutcome> {
        options.validate()?;

        let (id, context) = {
            let mut store = self.store.write().await;
            let carried = if options.carry_messages {
                store.get(parent_id)?.messages().to_vec()
            } else {
                Vec::new()
            };

            let id = store.create(options.new_id.as_deref(), parent_id)?;
            let transcript = store.get_mut(&id)?.transcript_mut();
            transcript.extend(carried);
            transcript.extend(options.preset_messages);

            tracing::info!(
                node_id = %id,
                parent_id = %parent_id,
                carry_messages = options.carry_messages,
                "Branch created"
            );

            let context = match &options.seed_message {
                Some(seed) => {
                    store.append(&id, Message::user(seed.as_str()))?;
                    Some(store.context(&id)?)
                }
                None => None,
            };
            (id, context)
        };

        if let Some(context) = context {
            let reply = self.complete(&id, &context).await?;
            self.store
                .write()
                .await
                .append(&id, Message::assistant(reply))?;
        }

        let messages = self.store.read().await.get(&id)?.messages().to_vec();
        Ok(BranchOutcome { id, messages })
    }

    /// Merge `source_id`'s transcript into `target_id`.
    ///
    /// Only the target changes; the source node stays as it was.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing node, `InvalidArgument` when both ids are equal.
    pub async fn merge(&self, target_id: &str, source_id: &str) -> Result<MergeOutcome> {
        let mut store = self.store.write().await;
        let target = store.get(target_id)?.messages().to_vec();
        let source = store.get(source_id)?.messages().to_vec();

        if target_id == source_id {
            return Err(BranchChatError::InvalidArgument(format!(
                "cannot merge node '{}' into itself",
                target_id
            )));
        }

        let (merged, mode) = merge_transcripts(&target, &source);
        store
            .get_mut(target_id)?
            .transcript_mut()
            .replace(merged.clone());

        tracing::info!(
            target_id = %target_id,
            source_id = %source_id,
            mode = %mode,
            message_count = merged.len(),
            "Branches merged"
        );

        Ok(MergeOutcome {
            messages: merged,
            mode,
        })
    }

    /// Create a sibling of `source_id` holding one assistant message that
    /// summarizes the source's full lineage.
    ///
    /// The new node's parent is the source's parent, or the root itself when
    /// the source is the root. Without an explicit id, `SUMM-<suffix>` is
    /// used; a taken id falls back to the smallest free `SUMM-<n>`.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidArgument` for a blank explicit id, `Backend`.
    pub async fn summarize_branch(
        &self,
        source_id: &str,
        new_id: Option<&str>,
    ) -> Result<BranchOutcome> {
        if let Some(id) = new_id {
            ensure_not_blank(id, "summary id")?;
        }

        let (context, parent_id) = {
            let store = self.store.read().await;
            let source = store.get(source_id)?;
            let parent_id = source.parent_id().unwrap_or(source.id()).to_string();
            (store.context(source_id)?, parent_id)
        };
        tracing::debug!(source_id = %source_id, context_len = context.len(), "Requesting summary");

        let responder = self.current_responder().await;
        let summary = responder.summarize(&context).await.map_err(|e| {
            tracing::warn!(source_id = %source_id, error = %e, "Summarization failed");
            e.into_backend()
        })?;

        let mut store = self.store.write().await;
        let preferred = new_id
            .map(str::to_string)
            .unwrap_or_else(|| default_summary_id(source_id));
        let id = if store.contains(&preferred) {
            let fallback = store.generate_id(SUMMARY_PREFIX);
            tracing::debug!(preferred = %preferred, fallback = %fallback, "Summary id taken");
            fallback
        } else {
            preferred
        };

        store.create(Some(&id), &parent_id)?;
        store.append(&id, Message::assistant(summary))?;
        let messages = store.get(&id)?.messages().to_vec();

        tracing::info!(
            node_id = %id,
            source_id = %source_id,
            parent_id = %parent_id,
            "Summary branch created"
        );

        Ok(BranchOutcome { id, messages })
    }

    async fn complete(&self, node_id: &str, context: &[Message]) -> Result<String> {
        let responder = self.current_responder().await;
        responder.complete(context).await.map_err(|e| {
            tracing::warn!(node_id = %node_id, error = %e, "Completion failed");
            e.into_backend()
        })
    }
}

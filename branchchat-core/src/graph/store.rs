//! In-memory node registry

use std::collections::HashMap;

use super::ids::{BRANCH_PREFIX, next_free_id};
use super::node::{Node, NodeSummary};
use crate::error::{BranchChatError, Result};
use crate::llm::Message;

/// All conversation nodes keyed by id.
///
/// Invariants:
/// - ids are unique
/// - every `parent_id` named an existing node when the child was created
/// - nodes are never removed, so parent links form a forest
pub struct NodeStore {
    nodes: HashMap<String, Node>,
    /// Ids in creation order
    order: Vec<String>,
    root_id: String,
}

impl NodeStore {
    /// Create a store holding a single empty root
    pub fn new(root_id: impl Into<String>) -> Self {
        let root_id = root_id.into();
        let mut store = Self {
            nodes: HashMap::new(),
            order: Vec::new(),
            root_id: root_id.clone(),
        };
        store.insert(Node::new(root_id, None));
        store
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Register a new empty node under `parent_id`.
    ///
    /// Without an explicit id the smallest unused `BRANCH-<n>` is chosen.
    ///
    /// # Errors
    ///
    /// `NotFound` if the parent is missing, `Conflict` if the explicit id is
    /// taken, `InvalidArgument` if the explicit id is blank.
    pub fn create(&mut self, id: Option<&str>, parent_id: &str) -> Result<String> {
        if !self.contains(parent_id) {
            return Err(BranchChatError::NotFound(parent_id.to_string()));
        }

        let id = match id {
            Some(id) if id.trim().is_empty() => {
                return Err(BranchChatError::InvalidArgument(
                    "node id must not be blank".to_string(),
                ));
            }
            Some(id) if self.contains(id) => {
                return Err(BranchChatError::Conflict(id.to_string()));
            }
            Some(id) => id.to_string(),
            None => self.generate_id(BRANCH_PREFIX),
        };

        self.insert(Node::new(id.clone(), Some(parent_id.to_string())));
        Ok(id)
    }

    /// Smallest unused `<prefix>-<n>` in this store
    pub fn generate_id(&self, prefix: &str) -> String {
        next_free_id(prefix, |candidate| self.contains(candidate))
    }

    fn insert(&mut self, node: Node) {
        self.order.push(node.id().to_string());
        self.nodes.insert(node.id().to_string(), node);
    }

    /// # Errors
    ///
    /// `NotFound` if no node has this id.
    pub fn get(&self, id: &str) -> Result<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| BranchChatError::NotFound(id.to_string()))
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Result<&mut Node> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| BranchChatError::NotFound(id.to_string()))
    }

    /// Append a message to a node's own transcript
    pub(crate) fn append(&mut self, id: &str, message: Message) -> Result<()> {
        self.get_mut(id)?.transcript_mut().push(message);
        Ok(())
    }

    /// Nodes in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Direct children of `id`, in creation order
    pub fn children(&self, id: &str) -> Result<Vec<&Node>> {
        self.get(id)?;
        Ok(self.iter().filter(|n| n.parent_id() == Some(id)).collect())
    }

    /// Every node with its children and message count, in creation order
    pub fn list(&self) -> Vec<NodeSummary> {
        let mut children: HashMap<&str, Vec<String>> = HashMap::new();
        for node in self.iter() {
            if let Some(parent) = node.parent_id() {
                children
                    .entry(parent)
                    .or_default()
                    .push(node.id().to_string());
            }
        }

        self.iter()
            .map(|node| NodeSummary {
                id: node.id().to_string(),
                parent_id: node.parent_id().map(str::to_string),
                children: children.remove(node.id()).unwrap_or_default(),
                message_count: node.messages().len(),
            })
            .collect()
    }

    /// Nodes from the root down to `id`, inclusive
    pub fn ancestors(&self, id: &str) -> Result<Vec<&Node>> {
        let mut chain = Vec::new();
        let mut cursor = Some(self.get(id)?);

        while let Some(node) = cursor {
            chain.push(node);
            cursor = match node.parent_id() {
                Some(parent) => Some(self.get(parent)?),
                None => None,
            };
        }

        chain.reverse();
        Ok(chain)
    }

    /// Full conversational context: ancestors' messages root first, then the node's own
    pub fn context(&self, id: &str) -> Result<Vec<Message>> {
        Ok(self
            .ancestors(id)?
            .into_iter()
            .flat_map(|node| node.messages().iter().cloned())
            .collect())
    }

    /// Number of parent hops between `id` and its root
    pub fn depth(&self, id: &str) -> Result<usize> {
        Ok(self.ancestors(id)?.len() - 1)
    }

    /// Indented text rendering of the forest; siblings sorted by id
    pub fn render_tree(&self) -> String {
        let mut roots: Vec<&Node> = Vec::new();
        let mut children: HashMap<&str, Vec<&Node>> = HashMap::new();
        for node in self.iter() {
            match node.parent_id() {
                Some(parent) => children.entry(parent).or_default().push(node),
                None => roots.push(node),
            }
        }

        // Reverse order so the smallest id is popped first
        roots.sort_by(|a, b| b.id().cmp(a.id()));
        let mut stack: Vec<(&Node, usize)> = roots.into_iter().map(|n| (n, 0)).collect();
        let mut lines = Vec::with_capacity(self.len());

        while let Some((node, depth)) = stack.pop() {
            lines.push(format!(
                "{}- {} ({} messages)",
                "  ".repeat(depth),
                node.id(),
                node.messages().len()
            ));

            if let Some(mut kids) = children.remove(node.id()) {
                kids.sort_by(|a, b| b.id().cmp(a.id()));
                stack.extend(kids.into_iter().map(|child| (child, depth + 1)));
            }
        }

        lines.join("\n")
    }
}

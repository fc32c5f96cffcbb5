//! Conversation nodes and their boundary views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::transcript::Transcript;
use crate::llm::Message;

/// A branch of the conversation tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    id: String,
    parent_id: Option<String>,
    transcript: Transcript,
    created_at: DateTime<Utc>,
}

impl Node {
    pub(crate) fn new(id: impl Into<String>, parent_id: Option<String>) -> Self {
        Self {
            id: id.into(),
            parent_id,
            transcript: Transcript::new(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub(crate) fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    /// The node's own turns (not its ancestors')
    pub fn messages(&self) -> &[Message] {
        self.transcript.messages()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn view(&self) -> NodeView {
        NodeView {
            id: self.id.clone(),
            parent_id: self.parent_id.clone(),
            messages: self.messages().to_vec(),
            created_at: self.created_at,
        }
    }
}

/// Node metadata plus its own messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: String,
    pub parent_id: Option<String>,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

/// Listing entry for a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub id: String,
    pub parent_id: Option<String>,
    /// Child ids in creation order
    pub children: Vec<String>,
    pub message_count: usize,
}

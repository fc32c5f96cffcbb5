//! Per-node transcript

use serde::{Deserialize, Serialize};

use crate::llm::{Message, MessageRole};

/// Ordered list of a node's own turns.
///
/// Only user and assistant messages are stored; system prompts belong to
/// responders, not to the conversation tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript(Vec<Message>);

impl Transcript {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Whether a message may be stored in a transcript
    pub fn accepts(message: &Message) -> bool {
        matches!(message.role, MessageRole::User | MessageRole::Assistant)
    }

    pub fn push(&mut self, message: Message) {
        debug_assert!(Self::accepts(&message));
        self.0.push(message);
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Message::assistant(content));
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        for message in messages {
            self.push(message);
        }
    }

    /// Replace the whole transcript
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.0 = messages;
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn last(&self) -> Option<&Message> {
        self.0.last()
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.0
    }
}

impl From<Vec<Message>> for Transcript {
    fn from(messages: Vec<Message>) -> Self {
        Self(messages)
    }
}

//! Deterministic responder for tests and offline sessions

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::Responder;
use crate::config::DEFAULT_STUB_REPLY;
use crate::error::{BranchChatError, Result};
use crate::llm::Message;

/// A recorded invocation of the stub
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubCall {
    Complete(Vec<Message>),
    Summarize(Vec<Message>),
}

impl StubCall {
    /// Transcript the stub was called with
    pub fn messages(&self) -> &[Message] {
        match self {
            StubCall::Complete(m) | StubCall::Summarize(m) => m,
        }
    }
}

/// Responder that returns predetermined text.
///
/// `complete` always returns the configured reply. `summarize` returns the
/// configured summary, or `"Summary of N messages"` when none is set. A stub
/// can be switched into failure mode to exercise backend-error paths.
pub struct StubResponder {
    reply: String,
    summary: Option<String>,
    failure: RwLock<Option<String>>,
    call_count: AtomicUsize,
    call_history: RwLock<Vec<StubCall>>,
}

impl Default for StubResponder {
    fn default() -> Self {
        Self::new(DEFAULT_STUB_REPLY)
    }
}

impl StubResponder {
    /// Create a stub with a fixed completion reply
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            summary: None,
            failure: RwLock::new(None),
            call_count: AtomicUsize::new(0),
            call_history: RwLock::new(Vec::new()),
        }
    }

    /// Use a fixed summary text
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Create a stub whose every call fails
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: RwLock::new(Some(message.into())),
            ..Self::default()
        }
    }

    /// Switch failure mode on (`Some`) or off (`None`)
    pub async fn set_failure(&self, message: Option<String>) {
        *self.failure.write().await = message;
    }

    /// Number of calls received (including failed ones)
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Every call received, in order
    pub async fn calls(&self) -> Vec<StubCall> {
        self.call_history.read().await.clone()
    }

    async fn record(&self, call: StubCall) -> Result<()> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.call_history.write().await.push(call);

        match self.failure.read().await.as_ref() {
            Some(message) => Err(BranchChatError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Responder for StubResponder {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        self.record(StubCall::Complete(messages.to_vec())).await?;
        Ok(self.reply.clone())
    }

    async fn summarize(&self, messages: &[Message]) -> Result<String> {
        self.record(StubCall::Summarize(messages.to_vec())).await?;
        Ok(self
            .summary
            .clone()
            .unwrap_or_else(|| format!("Summary of {} messages", messages.len())))
    }

    fn name(&self) -> String {
        "stub".to_string()
    }
}

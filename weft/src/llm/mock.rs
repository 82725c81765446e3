//! Mock LLM for tests and demos.
//!
//! Replies come from a script (one per call), from a closure over the
//! messages, or echo the last user message. Can also be set to fail.
//! [`MockLlm::from_response_fn`] also returns tool calls, for tool-loop graphs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::NodeError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;

type Responder = Box<dyn Fn(&[Message]) -> LlmResponse + Send + Sync>;

enum Mode {
    Scripted(Mutex<VecDeque<String>>),
    Responder(Responder),
    Failing(String),
}

/// Mock LLM.
///
/// **Interaction**: implements `LlmClient`; used by the CLI demos and tests.
pub struct MockLlm {
    mode: Mode,
    calls: AtomicUsize,
}

impl MockLlm {
    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
        }
    }

    /// Replies with `replies` in order; fails once the script runs out.
    pub fn scripted<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_mode(Mode::Scripted(Mutex::new(
            replies.into_iter().map(Into::into).collect(),
        )))
    }

    /// Always replies `content`.
    pub fn fixed(content: impl Into<String>) -> Self {
        let content = content.into();
        Self::from_fn(move |_| content.clone())
    }

    /// Replies with whatever `f` computes from the prompt.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&[Message]) -> String + Send + Sync + 'static,
    {
        Self::from_response_fn(move |messages| LlmResponse::text(f(messages)))
    }

    /// Like [`MockLlm::from_fn`], but `f` builds the whole reply, tool calls included.
    pub fn from_response_fn<F>(f: F) -> Self
    where
        F: Fn(&[Message]) -> LlmResponse + Send + Sync + 'static,
    {
        Self::with_mode(Mode::Responder(Box::new(f)))
    }

    /// Replies with the content of the last user message.
    pub fn echo() -> Self {
        Self::from_fn(|messages| {
            messages
                .iter()
                .rev()
                .find(|m| matches!(m, Message::User(_)))
                .map(|m| m.content().to_string())
                .unwrap_or_default()
        })
    }

    /// Every call fails with `ExecutionFailed(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_mode(Mode::Failing(message.into()))
    }

    /// Number of `invoke` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, NodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            Mode::Scripted(queue) => queue
                .lock()
                .map_err(|_| NodeError::ExecutionFailed("mock llm lock poisoned".into()))?
                .pop_front()
                .map(LlmResponse::text)
                .ok_or_else(|| NodeError::ExecutionFailed("mock llm script exhausted".into())),
            Mode::Responder(f) => Ok(f(messages)),
            Mode::Failing(message) => Err(NodeError::ExecutionFailed(message.clone())),
        }
    }
}

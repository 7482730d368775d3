//! Boundary traits for external providers.
//!
//! The pipelines are written against these traits, not concrete services:
//! a [`ChatModel`] turns a conversation into a completion, a [`SearchTool`]
//! turns a query into formatted results. Hosts supply real implementations;
//! tests supply scripted ones. Nothing inside the engine performs network
//! I/O.

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

use crate::message::{Message, ToolCall};
use crate::node::NodeError;

/// A chat-completion provider.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Produce a completion for the given conversation.
    async fn complete(&self, messages: &[Message]) -> Result<ChatResponse, ProviderError>;
}

/// A completion returned by a [`ChatModel`].
///
/// When `tool_call` is set, the model is asking the workflow to execute a
/// tool before the conversation continues.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatResponse {
    /// Text of the completion.
    pub content: String,
    /// Tool invocation requested by the model, if any.
    pub tool_call: Option<ToolCall>,
}

impl ChatResponse {
    /// A plain text completion.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_call: None,
        }
    }

    /// A completion requesting a tool invocation.
    pub fn with_tool_call(mut self, tool_call: ToolCall) -> Self {
        self.tool_call = Some(tool_call);
        self
    }

    /// Convert this completion into an assistant [`Message`].
    #[must_use]
    pub fn into_message(self) -> Message {
        let mut message = Message::assistant(self.content);
        message.tool_call = self.tool_call;
        message
    }
}

/// A web-search provider.
#[async_trait]
pub trait SearchTool: Send + Sync {
    /// Run a search and return pre-formatted results text.
    async fn search(&self, query: &str) -> Result<String, ProviderError>;
}

/// Failure reported by an external provider.
#[derive(Debug, Error, Diagnostic)]
#[error("provider {provider} failed: {message}")]
#[diagnostic(code(factloom::pipelines::provider))]
pub struct ProviderError {
    /// Which provider failed.
    pub provider: &'static str,
    /// Provider-reported failure detail.
    pub message: String,
}

impl ProviderError {
    pub fn new(provider: &'static str, message: impl Into<String>) -> Self {
        Self {
            provider,
            message: message.into(),
        }
    }
}

impl From<ProviderError> for NodeError {
    fn from(err: ProviderError) -> Self {
        NodeError::Provider {
            provider: err.provider,
            message: err.message,
        }
    }
}

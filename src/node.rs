//! Node execution framework for the factloom workflow engine.
//!
//! This module provides the core abstractions for executable workflow nodes:
//! the [`Node`] trait, the execution context, typed partial state updates,
//! and node-level error handling.

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

use crate::event_bus::Event;
use crate::message::Message;
use crate::state::StateSnapshot;

// ============================================================================
// Core Trait
// ============================================================================

/// Core trait defining executable workflow nodes.
///
/// A node is a single unit of computation within a workflow. It receives a
/// cloned [`StateSnapshot`] and an execution context, performs its work, and
/// returns a [`NodePartial`] describing the state fields it wants to update.
/// Nodes never mutate state directly; the runner's merge barrier folds the
/// partial back into the canonical state.
///
/// # Design Principles
///
/// - **Stateless**: nodes should be stateless and deterministic
/// - **Focused**: each node has a single, well-defined responsibility
/// - **Observable**: use the context to emit events for monitoring
///
/// # Examples
///
/// ```rust,no_run
/// use factloom::node::{Node, NodeContext, NodeError, NodePartial};
/// use factloom::state::StateSnapshot;
/// use async_trait::async_trait;
///
/// struct TopicGuard;
///
/// #[async_trait]
/// impl Node for TopicGuard {
///     async fn run(
///         &self,
///         snapshot: StateSnapshot,
///         ctx: NodeContext,
///     ) -> Result<NodePartial, NodeError> {
///         ctx.emit("guard", "checking topic")?;
///         if snapshot.topic.trim().is_empty() {
///             return Err(NodeError::MissingInput { what: "topic" });
///         }
///         Ok(NodePartial::new())
///     }
/// }
/// ```
#[async_trait]
pub trait Node: Send + Sync {
    /// Execute this node with the given state snapshot and context.
    async fn run(
        &self,
        snapshot: StateSnapshot,
        ctx: NodeContext,
    ) -> Result<NodePartial, NodeError>;
}

// ============================================================================
// Execution Context
// ============================================================================

/// Execution context passed to nodes during workflow execution.
///
/// Gives a node its identity within the run, the current step number, and a
/// channel for emitting observability events.
#[derive(Clone, Debug)]
pub struct NodeContext {
    /// Identifier of the node being executed.
    pub node_id: String,
    /// Current execution step number.
    pub step: u64,
    /// Channel for emitting events to the workflow's event bus.
    pub event_bus_sender: flume::Sender<Event>,
}

impl NodeContext {
    /// Emit a node-scoped event enriched with this context's metadata.
    pub fn emit(
        &self,
        scope: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<(), NodeContextError> {
        self.event_bus_sender
            .send(Event::node_message_with_meta(
                self.node_id.clone(),
                self.step,
                scope,
                message,
            ))
            .map_err(|_| NodeContextError::EventBusUnavailable)
    }
}

// ============================================================================
// State Updates
// ============================================================================

/// Typed partial state update returned by node execution.
///
/// One optional field per state channel: `None` means "leave that channel
/// alone", `Some` means "hand this value to the channel's reducer". Because
/// the fields are typed and closed, a node cannot address an unknown channel
/// or submit a wrongly-typed value; such mistakes fail at compile time
/// instead of at merge time.
///
/// # Examples
///
/// ```rust
/// use factloom::node::NodePartial;
/// use factloom::message::Message;
///
/// let partial = NodePartial::new()
///     .with_messages(vec![Message::assistant("drafted")])
///     .with_article("The article text".to_string());
/// assert!(partial.search_queries.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct NodePartial {
    /// Messages to append to the conversation log.
    pub messages: Option<Vec<Message>>,
    /// Replacement for the planned search queries.
    pub search_queries: Option<Vec<String>>,
    /// Replacement for the gathered search results.
    pub search_results: Option<String>,
    /// Replacement for the extracted facts.
    pub extracted_facts: Option<Vec<String>>,
    /// Replacement for the drafted article.
    pub article: Option<String>,
    /// Replacement for the fact-check verdict.
    pub fact_check_result: Option<String>,
}

impl NodePartial {
    /// Create an empty partial. Merging it is a no-op.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages to append to the conversation log.
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = Some(messages);
        self
    }

    /// Replace the planned search queries.
    #[must_use]
    pub fn with_search_queries(mut self, queries: Vec<String>) -> Self {
        self.search_queries = Some(queries);
        self
    }

    /// Replace the gathered search results.
    #[must_use]
    pub fn with_search_results(mut self, results: String) -> Self {
        self.search_results = Some(results);
        self
    }

    /// Replace the extracted facts.
    #[must_use]
    pub fn with_extracted_facts(mut self, facts: Vec<String>) -> Self {
        self.extracted_facts = Some(facts);
        self
    }

    /// Replace the drafted article.
    #[must_use]
    pub fn with_article(mut self, article: String) -> Self {
        self.article = Some(article);
        self
    }

    /// Replace the fact-check verdict.
    #[must_use]
    pub fn with_fact_check_result(mut self, result: String) -> Self {
        self.fact_check_result = Some(result);
        self
    }

    /// Returns `true` if no channel is addressed by this partial.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_none()
            && self.search_queries.is_none()
            && self.search_results.is_none()
            && self.extracted_facts.is_none()
            && self.article.is_none()
            && self.fact_check_result.is_none()
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur when using NodeContext methods.
#[derive(Debug, Error, Diagnostic)]
pub enum NodeContextError {
    /// Event could not be sent because the event bus is gone.
    #[error("failed to emit event: event bus unavailable")]
    #[diagnostic(
        code(factloom::node::event_bus_unavailable),
        help("The event bus may be disconnected. Check workflow state.")
    )]
    EventBusUnavailable,
}

/// Errors that can occur during node execution.
///
/// A `NodeError` is fatal to the step that produced it: the runner wraps it
/// with the node identity and step number, skips the merge for that step,
/// and halts the run.
#[derive(Debug, Error, Diagnostic)]
pub enum NodeError {
    /// Expected input data is missing from the state snapshot.
    #[error("missing expected input: {what}")]
    #[diagnostic(
        code(factloom::node::missing_input),
        help("Check that an upstream node produced the required data.")
    )]
    MissingInput { what: &'static str },

    /// External provider or service error.
    #[error("provider error ({provider}): {message}")]
    #[diagnostic(code(factloom::node::provider))]
    Provider {
        provider: &'static str,
        message: String,
    },

    /// JSON serialization/deserialization error.
    #[error(transparent)]
    #[diagnostic(code(factloom::node::serde_json))]
    Serde(#[from] serde_json::Error),

    /// Input validation failed.
    #[error("validation failed: {0}")]
    #[diagnostic(
        code(factloom::node::validation),
        help("Check input data format and required fields.")
    )]
    ValidationFailed(String),

    /// Event bus communication error.
    #[error("event bus error: {0}")]
    #[diagnostic(code(factloom::node::event_bus))]
    EventBus(#[from] NodeContextError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_partial() {
        assert!(NodePartial::new().is_empty());
        assert!(!NodePartial::new().with_article("a".into()).is_empty());
    }

    #[test]
    fn test_builders_address_only_named_channels() {
        let partial = NodePartial::new()
            .with_messages(vec![Message::assistant("hi")])
            .with_extracted_facts(vec!["fact".into()]);
        assert!(partial.messages.is_some());
        assert!(partial.extracted_facts.is_some());
        assert!(partial.article.is_none());
        assert!(partial.search_results.is_none());
    }
}

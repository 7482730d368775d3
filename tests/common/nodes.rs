use async_trait::async_trait;
use factloom::message::Message;
use factloom::node::{Node, NodeContext, NodeError, NodePartial};
use factloom::state::StateSnapshot;

/// Appends a single assistant message.
#[derive(Debug, Clone)]
pub struct SimpleMessageNode {
    pub msg: &'static str,
}

impl SimpleMessageNode {
    pub fn new(msg: &'static str) -> Self {
        Self { msg }
    }
}

#[async_trait]
impl Node for SimpleMessageNode {
    async fn run(
        &self,
        _snapshot: StateSnapshot,
        _ctx: NodeContext,
    ) -> Result<NodePartial, NodeError> {
        Ok(NodePartial::new().with_messages(vec![Message::assistant(self.msg)]))
    }
}

/// Produces an empty partial.
#[derive(Debug, Clone)]
pub struct NoopNode;

#[async_trait]
impl Node for NoopNode {
    async fn run(
        &self,
        _snapshot: StateSnapshot,
        _ctx: NodeContext,
    ) -> Result<NodePartial, NodeError> {
        Ok(NodePartial::default())
    }
}

/// Always fails with a validation error.
#[derive(Debug, Clone)]
pub struct FailingNode;

#[async_trait]
impl Node for FailingNode {
    async fn run(
        &self,
        _snapshot: StateSnapshot,
        _ctx: NodeContext,
    ) -> Result<NodePartial, NodeError> {
        Err(NodeError::ValidationFailed("intentional failure".into()))
    }
}

/// Overwrites the article field with a fixed value.
#[derive(Debug, Clone)]
pub struct SetArticleNode {
    pub article: &'static str,
}

#[async_trait]
impl Node for SetArticleNode {
    async fn run(
        &self,
        _snapshot: StateSnapshot,
        _ctx: NodeContext,
    ) -> Result<NodePartial, NodeError> {
        Ok(NodePartial::new().with_article(self.article.to_string()))
    }
}

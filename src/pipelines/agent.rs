//! Conditional agent loop with tool calling.
//!
//! Three nodes: `research` converses with the model, `tools` executes the
//! search the model asked for, `write` drafts the final article. After each
//! `research` turn a branch function inspects the newest assistant message:
//! a pending tool call routes to `tools` (which loops back to `research`),
//! otherwise execution moves on to `write` and then End. The runner's step
//! ceiling bounds how long the research/tools loop may spin.

use std::sync::Arc;

use async_trait::async_trait;

use crate::app::App;
use crate::graphs::{BranchPredicate, GraphBuilder, GraphCompileError};
use crate::message::Message;
use crate::node::{Node, NodeContext, NodeError, NodePartial};
use crate::runner::RuntimeConfig;
use crate::state::StateSnapshot;
use crate::types::NodeKind;

use super::providers::{ChatModel, SearchTool};

/// Node names for the agent workflow.
pub mod nodes {
    pub const RESEARCH: &str = "research";
    pub const TOOLS: &str = "tools";
    pub const WRITE: &str = "write";
}

/// Branch labels returned after the research node.
pub mod labels {
    pub const TOOLS: &str = "tools";
    pub const WRITE: &str = "write";
}

/// Name of the search tool exposed to the model.
pub const WEB_SEARCH_TOOL: &str = "web_search";

/// Conversational research node.
///
/// Feeds the whole conversation to the model. The model either answers
/// directly or requests a `web_search` invocation; either way the reply is
/// appended to the log and routing decides what happens next.
pub struct ResearchAgent {
    model: Arc<dyn ChatModel>,
}

impl ResearchAgent {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Node for ResearchAgent {
    async fn run(
        &self,
        snapshot: StateSnapshot,
        ctx: NodeContext,
    ) -> Result<NodePartial, NodeError> {
        ctx.emit("research", "requesting model turn")?;
        let response = self.model.complete(&snapshot.messages).await?;

        let message = response.into_message();
        if message.requests_tool() {
            ctx.emit("research", "model requested a tool call")?;
        } else {
            ctx.emit("research", "model finished researching")?;
        }
        Ok(NodePartial::new().with_messages(vec![message]))
    }
}

/// Executes the tool call pending in the newest assistant message.
pub struct ToolExecutor {
    search: Arc<dyn SearchTool>,
}

impl ToolExecutor {
    pub fn new(search: Arc<dyn SearchTool>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl Node for ToolExecutor {
    async fn run(
        &self,
        snapshot: StateSnapshot,
        ctx: NodeContext,
    ) -> Result<NodePartial, NodeError> {
        let call = snapshot
            .last_message()
            .and_then(|message| message.tool_call.clone())
            .ok_or(NodeError::MissingInput { what: "tool_call" })?;

        if call.name != WEB_SEARCH_TOOL {
            return Err(NodeError::ValidationFailed(format!(
                "unsupported tool: {}",
                call.name
            )));
        }
        let query = call
            .arguments
            .get("query")
            .and_then(|value| value.as_str())
            .ok_or(NodeError::MissingInput {
                what: "tool_call.arguments.query",
            })?
            .to_string();

        ctx.emit("tools", format!("executing {WEB_SEARCH_TOOL}: {query:?}"))?;
        // Search failures become tool output so the model can recover.
        let content = match self.search.search(&query).await {
            Ok(result) => result,
            Err(err) => format!("Error: {err}"),
        };

        Ok(NodePartial::new().with_messages(vec![Message::tool(content)]))
    }
}

/// Drafts the final article from the accumulated conversation.
pub struct WriteArticle {
    model: Arc<dyn ChatModel>,
}

impl WriteArticle {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Node for WriteArticle {
    async fn run(
        &self,
        snapshot: StateSnapshot,
        ctx: NodeContext,
    ) -> Result<NodePartial, NodeError> {
        ctx.emit("write", "drafting final article")?;

        let mut conversation = snapshot.messages.clone();
        conversation.push(Message::user(format!(
            "Using everything gathered above, write a 3-paragraph article about {}. \
             Target audience: Technical professionals.",
            snapshot.topic
        )));

        let response = self.model.complete(&conversation).await?;
        Ok(NodePartial::new()
            .with_article(response.content.clone())
            .with_messages(vec![response.into_message()]))
    }
}

/// Branch function evaluated after each research turn.
///
/// Routes to [`labels::TOOLS`] if the newest message carries a pending tool
/// call, otherwise to [`labels::WRITE`].
#[must_use]
pub fn route_after_research() -> BranchPredicate {
    Arc::new(|snapshot| {
        match snapshot.last_message() {
            Some(message) if message.requests_tool() => labels::TOOLS.to_string(),
            _ => labels::WRITE.to_string(),
        }
    })
}

/// Builds the three-node agent workflow.
///
/// # Errors
///
/// Surfaces graph compilation failures.
pub fn agent_workflow(
    model: Arc<dyn ChatModel>,
    search: Arc<dyn SearchTool>,
    runtime_config: RuntimeConfig,
) -> Result<App, GraphCompileError> {
    GraphBuilder::new()
        .add_node(NodeKind::from(nodes::RESEARCH), ResearchAgent::new(model.clone()))
        .add_node(NodeKind::from(nodes::TOOLS), ToolExecutor::new(search))
        .add_node(NodeKind::from(nodes::WRITE), WriteArticle::new(model))
        .set_entry(NodeKind::from(nodes::RESEARCH))
        .add_conditional_edge(
            NodeKind::from(nodes::RESEARCH),
            route_after_research(),
            [
                (labels::TOOLS.to_string(), NodeKind::from(nodes::TOOLS)),
                (labels::WRITE.to_string(), NodeKind::from(nodes::WRITE)),
            ],
        )
        .add_edge(NodeKind::from(nodes::TOOLS), NodeKind::from(nodes::RESEARCH))
        .add_edge(NodeKind::from(nodes::WRITE), NodeKind::End)
        .with_runtime_config(runtime_config)
        .compile()
}

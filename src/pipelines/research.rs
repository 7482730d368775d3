//! Linear five-stage research pipeline.
//!
//! `query_planner → researcher → fact_extractor → writer → fact_checker`,
//! then End. Planning and writing go through the [`ChatModel`] boundary,
//! searching through [`SearchTool`]. Each stage appends its prompt and
//! response to the conversation log so the full exchange is visible in the
//! final state.

use std::sync::Arc;

use async_trait::async_trait;

use crate::graphs::{GraphBuilder, GraphCompileError};
use crate::app::App;
use crate::message::Message;
use crate::node::{Node, NodeContext, NodeError, NodePartial};
use crate::runner::RuntimeConfig;
use crate::state::StateSnapshot;
use crate::types::NodeKind;

use super::providers::{ChatModel, SearchTool};

/// Node names for the research pipeline.
pub mod nodes {
    pub const QUERY_PLANNER: &str = "query_planner";
    pub const RESEARCHER: &str = "researcher";
    pub const FACT_EXTRACTOR: &str = "fact_extractor";
    pub const WRITER: &str = "writer";
    pub const FACT_CHECKER: &str = "fact_checker";
}

/// Searches executed per run. Queries beyond this are ignored.
const MAX_SEARCHES: usize = 2;

/// Plans the search strategy for the topic.
pub struct QueryPlanner {
    model: Arc<dyn ChatModel>,
}

impl QueryPlanner {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Node for QueryPlanner {
    async fn run(
        &self,
        snapshot: StateSnapshot,
        ctx: NodeContext,
    ) -> Result<NodePartial, NodeError> {
        ctx.emit("plan", format!("planning queries for {:?}", snapshot.topic))?;

        let system = Message::system(
            "You are a research strategist. Generate 2 focused search queries.",
        );
        let prompt = Message::user(format!(
            "Topic: {}\n\nGenerate exactly 2 specific search queries to research this topic.\n\
             Focus on recent developments and technical details.\n\n\
             Return ONLY the queries, one per line, no numbering or bullets.",
            snapshot.topic
        ));

        let response = self
            .model
            .complete(&[system.clone(), prompt.clone()])
            .await?;

        let queries: Vec<String> = response
            .content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect();

        ctx.emit("plan", format!("planned {} queries", queries.len()))?;
        Ok(NodePartial::new()
            .with_search_queries(queries)
            .with_messages(vec![system, prompt, response.into_message()]))
    }
}

/// Executes the planned queries directly, no tool loop.
pub struct Researcher {
    search: Arc<dyn SearchTool>,
}

impl Researcher {
    pub fn new(search: Arc<dyn SearchTool>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl Node for Researcher {
    async fn run(
        &self,
        snapshot: StateSnapshot,
        ctx: NodeContext,
    ) -> Result<NodePartial, NodeError> {
        let queries: Vec<&String> = snapshot.search_queries.iter().take(MAX_SEARCHES).collect();
        ctx.emit("search", format!("running {} searches", queries.len()))?;

        // A failed search is embedded in the results rather than failing the
        // run; downstream stages see the error text and work around it.
        let mut all_results = Vec::with_capacity(queries.len());
        for query in &queries {
            let block = match self.search.search(query).await {
                Ok(result) => format!("=== Search: {query} ===\n{result}"),
                Err(err) => {
                    ctx.emit("search", format!("search failed: {err}"))?;
                    format!("=== Search: {query} ===\nError: {err}")
                }
            };
            all_results.push(block);
        }
        let search_results = all_results.join("\n\n");

        let summary = Message::assistant(format!(
            "Completed {} searches.\n\n{search_results}",
            queries.len()
        ));
        Ok(NodePartial::new()
            .with_search_results(search_results)
            .with_messages(vec![summary]))
    }
}

/// Distills the raw search results into a verifiable fact list.
pub struct FactExtractor {
    model: Arc<dyn ChatModel>,
}

impl FactExtractor {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Node for FactExtractor {
    async fn run(
        &self,
        snapshot: StateSnapshot,
        ctx: NodeContext,
    ) -> Result<NodePartial, NodeError> {
        ctx.emit("extract", "extracting facts from search results")?;

        let system = Message::system(
            "You are a fact extraction specialist. Extract only verifiable facts from research. \
             Do not add any interpretation or information not explicitly stated in the research.",
        );
        let prompt = Message::user(format!(
            "From the search results below, extract key facts as a numbered list.\n\n\
             RULES:\n\
             - Only include facts explicitly stated in the search results\n\
             - Each fact should be a single, specific claim\n\
             - Do NOT add any information not in the search results\n\n\
             Search Results:\n{}\n\nExtract 5-8 key facts:",
            snapshot.search_results
        ));

        let response = self
            .model
            .complete(&[system.clone(), prompt.clone()])
            .await?;

        let facts: Vec<String> = response
            .content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect();

        ctx.emit("extract", format!("extracted {} facts", facts.len()))?;
        Ok(NodePartial::new()
            .with_extracted_facts(facts)
            .with_messages(vec![system, prompt, response.into_message()]))
    }
}

/// Drafts the article from the extracted facts.
pub struct Writer {
    model: Arc<dyn ChatModel>,
}

impl Writer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Node for Writer {
    async fn run(
        &self,
        snapshot: StateSnapshot,
        ctx: NodeContext,
    ) -> Result<NodePartial, NodeError> {
        ctx.emit("draft", "drafting article")?;

        let facts_text = snapshot.extracted_facts.join("\n");
        let system = Message::system(
            "You are a professional tech writer. Write engaging articles based on the facts provided.",
        );
        let prompt = Message::user(format!(
            "Write a 3-paragraph article about {}.\n\n\
             Available facts:\n{facts_text}\n\n\
             Requirements:\n\
             - Start with an engaging hook\n\
             - Explain key developments clearly\n\
             - End with future implications\n\
             - Target audience: Technical professionals\n\n\
             Write the article:",
            snapshot.topic
        ));

        let response = self
            .model
            .complete(&[system.clone(), prompt.clone()])
            .await?;

        Ok(NodePartial::new()
            .with_article(response.content.clone())
            .with_messages(vec![system, prompt, response.into_message()]))
    }
}

/// Verifies the article's claims against the extracted facts.
pub struct FactChecker {
    model: Arc<dyn ChatModel>,
}

impl FactChecker {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Node for FactChecker {
    async fn run(
        &self,
        snapshot: StateSnapshot,
        ctx: NodeContext,
    ) -> Result<NodePartial, NodeError> {
        ctx.emit("verify", "checking article against facts")?;

        let facts_text = snapshot.extracted_facts.join("\n");
        let system = Message::system(
            "You are a fact-checking specialist. Compare articles against source facts \
             and identify any claims not supported by the evidence.",
        );
        let prompt = Message::user(format!(
            "Compare the article against the verified facts and identify any issues.\n\n\
             VERIFIED FACTS:\n{facts_text}\n\n\
             ARTICLE TO CHECK:\n{}\n\n\
             For each claim in the article, determine if it is:\n\
             - VERIFIED: Directly supported by the facts\n\
             - UNSUPPORTED: Not found in the facts (potential hallucination)\n\
             - EXAGGERATED: Overstates what the facts say\n\n\
             Provide your analysis:",
            snapshot.article
        ));

        let response = self
            .model
            .complete(&[system.clone(), prompt.clone()])
            .await?;

        Ok(NodePartial::new()
            .with_fact_check_result(response.content.clone())
            .with_messages(vec![system, prompt, response.into_message()]))
    }
}

/// Builds the linear research workflow.
///
/// # Errors
///
/// Graph compilation cannot fail for this fixed topology unless the
/// builder itself regresses, but the error is surfaced rather than
/// swallowed.
pub fn research_workflow(
    model: Arc<dyn ChatModel>,
    search: Arc<dyn SearchTool>,
    runtime_config: RuntimeConfig,
) -> Result<App, GraphCompileError> {
    GraphBuilder::new()
        .add_node(NodeKind::from(nodes::QUERY_PLANNER), QueryPlanner::new(model.clone()))
        .add_node(NodeKind::from(nodes::RESEARCHER), Researcher::new(search))
        .add_node(NodeKind::from(nodes::FACT_EXTRACTOR), FactExtractor::new(model.clone()))
        .add_node(NodeKind::from(nodes::WRITER), Writer::new(model.clone()))
        .add_node(NodeKind::from(nodes::FACT_CHECKER), FactChecker::new(model))
        .set_entry(NodeKind::from(nodes::QUERY_PLANNER))
        .add_edge(
            NodeKind::from(nodes::QUERY_PLANNER),
            NodeKind::from(nodes::RESEARCHER),
        )
        .add_edge(
            NodeKind::from(nodes::RESEARCHER),
            NodeKind::from(nodes::FACT_EXTRACTOR),
        )
        .add_edge(
            NodeKind::from(nodes::FACT_EXTRACTOR),
            NodeKind::from(nodes::WRITER),
        )
        .add_edge(
            NodeKind::from(nodes::WRITER),
            NodeKind::from(nodes::FACT_CHECKER),
        )
        .add_edge(NodeKind::from(nodes::FACT_CHECKER), NodeKind::End)
        .with_runtime_config(runtime_config)
        .compile()
}

//! Ready-made workflows built on the graph engine.
//!
//! Two pipelines ship with the crate:
//!
//! - [`research`]: a linear five-stage pipeline
//!   (`query_planner → researcher → fact_extractor → writer → fact_checker`)
//!   that plans searches, gathers results, distills facts, drafts an
//!   article, and verifies it.
//! - [`agent`]: a three-node conditional loop where the model drives its own
//!   searching through tool calls before writing.
//!
//! Both are written against the [`ChatModel`] and [`SearchTool`] boundary
//! traits; hosts decide what sits behind them.

pub mod agent;
pub mod providers;
pub mod research;

pub use agent::agent_workflow;
pub use providers::{ChatModel, ChatResponse, ProviderError, SearchTool};
pub use research::research_workflow;

use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;
use tracing::instrument;

use crate::graphs::GraphCompileError;
use crate::runner::{RunnerError, RuntimeConfig};
use crate::state::ResearchState;

/// Final output of a research run.
#[derive(Clone, Debug, PartialEq)]
pub struct ResearchReport {
    /// Topic the run was started with.
    pub topic: String,
    /// Drafted article.
    pub article: String,
    /// Verdict from the fact-checking stage.
    pub fact_check_result: String,
}

/// Errors raised by the pipeline entry points.
#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    /// The topic was empty or whitespace.
    #[error("research topic must not be empty")]
    #[diagnostic(
        code(factloom::pipelines::empty_topic),
        help("Provide a non-empty topic string.")
    )]
    EmptyTopic,

    /// The workflow graph failed to compile.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Compile(#[from] GraphCompileError),

    /// The workflow failed while running.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Run(#[from] RunnerError),
}

/// Run the linear research pipeline for `topic` and return the report.
///
/// # Errors
///
/// Fails on an empty topic, a graph compilation regression, or any
/// [`RunnerError`] raised during execution.
#[instrument(skip(model, search))]
pub async fn run_research(
    topic: &str,
    model: Arc<dyn ChatModel>,
    search: Arc<dyn SearchTool>,
) -> Result<ResearchReport, PipelineError> {
    if topic.trim().is_empty() {
        return Err(PipelineError::EmptyTopic);
    }

    let app = research_workflow(model, search, RuntimeConfig::default())?;
    let state = app.invoke(ResearchState::new_with_topic(topic)).await?;

    Ok(ResearchReport {
        topic: state.topic.snapshot(),
        article: state.article.snapshot(),
        fact_check_result: state.fact_check_result.snapshot(),
    })
}

/// Run the agent loop for `topic` and return the drafted article.
///
/// # Errors
///
/// Same failure modes as [`run_research`], plus
/// [`RunnerError::StepLimitExceeded`] when the research/tools loop fails to
/// settle within the configured ceiling.
#[instrument(skip(model, search))]
pub async fn run_agent(
    topic: &str,
    model: Arc<dyn ChatModel>,
    search: Arc<dyn SearchTool>,
) -> Result<String, PipelineError> {
    if topic.trim().is_empty() {
        return Err(PipelineError::EmptyTopic);
    }

    let app = agent_workflow(model, search, RuntimeConfig::default())?;
    let state = app.invoke(ResearchState::new_with_topic(topic)).await?;
    Ok(state.article.snapshot())
}

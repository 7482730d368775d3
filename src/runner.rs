//! Runtime execution engine for compiled workflows.
//!
//! [`AppRunner`] wraps an [`App`] with the runtime environment: the event
//! bus, the step loop, and the step ceiling. Execution is sequential and
//! deterministic: one node runs per step, its output is merged at the
//! barrier, routing is resolved against the post-merge snapshot, and the
//! loop continues until the route reaches [`NodeKind::End`] or a failure
//! stops it.

use miette::Diagnostic;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

use crate::app::{App, BarrierOutcome};
use crate::event_bus::{Event, EventBus};
use crate::graphs::EdgeSpec;
use crate::node::{NodeContext, NodeError};
use crate::state::ResearchState;
use crate::types::NodeKind;
use crate::utils::IdGenerator;

/// Runtime configuration for workflow execution.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Identifier for this run, used in logs and events.
    pub run_id: String,
    /// Hard ceiling on executed steps; exceeding it halts the run.
    pub max_steps: u64,
}

impl RuntimeConfig {
    /// Default step ceiling. Generous for the built-in pipelines while
    /// still catching routing cycles that never reach End.
    pub const DEFAULT_MAX_STEPS: u64 = 32;

    /// Config with a generated run id and the default step ceiling.
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: IdGenerator::new().generate_run_id(),
            max_steps: Self::DEFAULT_MAX_STEPS,
        }
    }

    /// Override the step ceiling. A ceiling of 0 forbids any execution.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Override the run identifier.
    #[must_use]
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Record of one executed step.
#[derive(Debug, Clone)]
pub struct StepReport {
    /// 1-based step number.
    pub step: u64,
    /// Node that ran.
    pub node: NodeKind,
    /// Channels updated at the barrier.
    pub barrier_outcome: BarrierOutcome,
    /// Where routing sent execution next.
    pub next: NodeKind,
}

/// Errors raised while executing a compiled workflow.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// A node returned a fatal error; its output was not merged.
    #[error("node {node} failed at step {step}")]
    #[diagnostic(
        code(factloom::runner::node_run),
        help("State reflects every merge before this step; the failing node's output was discarded.")
    )]
    NodeRun {
        node: NodeKind,
        step: u64,
        #[source]
        source: NodeError,
    },

    /// A branch function returned a label with no mapped target.
    #[error("node {node} routed to unmapped branch label {label:?}")]
    #[diagnostic(
        code(factloom::runner::unknown_branch_label),
        help("Every label a branch function can return must appear in the route table.")
    )]
    UnknownBranchLabel { node: NodeKind, label: String },

    /// The step ceiling was reached before routing hit End.
    #[error("step limit of {limit} exceeded without reaching End")]
    #[diagnostic(
        code(factloom::runner::step_limit),
        help("Raise max_steps in RuntimeConfig, or check the graph for a routing cycle.")
    )]
    StepLimitExceeded { limit: u64 },

    /// Routing reached a node with no outgoing edge.
    ///
    /// Compilation rejects dangling nodes, so this indicates a graph that
    /// bypassed validation.
    #[error("node {node} has no route onward")]
    #[diagnostic(code(factloom::runner::missing_route))]
    MissingRoute { node: NodeKind },
}

/// Drives a compiled [`App`] to completion.
///
/// The runner owns the [`EventBus`] for the run: node emissions and runtime
/// diagnostics flow through it to whatever sinks the caller configured.
/// [`App::invoke`] constructs one internally with a stdout bus; hosts that
/// want streaming build their own.
pub struct AppRunner {
    app: Arc<App>,
    event_bus: EventBus,
}

impl AppRunner {
    /// Create a runner and start the bus listener.
    #[must_use]
    pub fn new(app: App, event_bus: EventBus) -> Self {
        event_bus.listen_for_events();
        Self {
            app: Arc::new(app),
            event_bus,
        }
    }

    /// Execute the workflow from its entry point until routing reaches End.
    ///
    /// Each step: check the ceiling, snapshot, run the node, merge its
    /// output at the barrier, then resolve routing against the post-merge
    /// snapshot. On failure the run stops with state reflecting every merge
    /// completed before the failing step.
    ///
    /// # Errors
    ///
    /// See [`RunnerError`] for the failure modes.
    #[instrument(skip(self, state), fields(run_id = %self.app.runtime_config().run_id))]
    pub async fn run(
        &self,
        state: ResearchState,
    ) -> Result<(ResearchState, Vec<StepReport>), RunnerError> {
        let result = self.run_inner(state).await;
        self.event_bus.stop_listener().await;
        result
    }

    async fn run_inner(
        &self,
        mut state: ResearchState,
    ) -> Result<(ResearchState, Vec<StepReport>), RunnerError> {
        let config = self.app.runtime_config();
        let sender = self.event_bus.get_sender();
        let mut reports: Vec<StepReport> = Vec::new();
        let mut current = self.app.entry().clone();
        let mut step: u64 = 0;

        while !current.is_end() {
            if step >= config.max_steps {
                self.diagnostic(&sender, "runner", "step limit exceeded");
                return Err(RunnerError::StepLimitExceeded {
                    limit: config.max_steps,
                });
            }
            step += 1;

            let node = self
                .app
                .nodes()
                .get(&current)
                .cloned()
                .ok_or_else(|| RunnerError::MissingRoute {
                    node: current.clone(),
                })?;

            let ctx = NodeContext {
                node_id: current.to_string(),
                step,
                event_bus_sender: sender.clone(),
            };

            tracing::debug!(node = %current, step, "running node");
            let partial = node
                .run(state.snapshot(), ctx)
                .await
                .map_err(|source| RunnerError::NodeRun {
                    node: current.clone(),
                    step,
                    source,
                })?;

            let barrier_outcome = self.app.apply_barrier(&mut state, &current, &partial);
            self.diagnostic(
                &sender,
                "barrier",
                format!(
                    "step {step}: {} updated {:?}",
                    current, barrier_outcome.updated_channels
                ),
            );

            let next = self.resolve_route(&current, &state, &sender)?;
            reports.push(StepReport {
                step,
                node: current.clone(),
                barrier_outcome,
                next: next.clone(),
            });
            current = next;
        }

        self.diagnostic(&sender, "runner", format!("completed in {step} steps"));
        Ok((state, reports))
    }

    /// Resolve the next node after `current`, using the post-merge state.
    fn resolve_route(
        &self,
        current: &NodeKind,
        state: &ResearchState,
        sender: &flume::Sender<Event>,
    ) -> Result<NodeKind, RunnerError> {
        let spec = self
            .app
            .edges()
            .get(current)
            .ok_or_else(|| RunnerError::MissingRoute {
                node: current.clone(),
            })?;

        match spec {
            EdgeSpec::Direct(to) => Ok(to.clone()),
            EdgeSpec::Conditional(edge) => {
                let snapshot = state.snapshot();
                let (label, target) = edge.select(&snapshot);
                match target {
                    Some(to) => {
                        self.diagnostic(
                            sender,
                            "routing",
                            format!("{current} branched {label:?} -> {to}"),
                        );
                        Ok(to.clone())
                    }
                    None => Err(RunnerError::UnknownBranchLabel {
                        node: current.clone(),
                        label,
                    }),
                }
            }
        }
    }

    fn diagnostic(
        &self,
        sender: &flume::Sender<Event>,
        scope: &str,
        message: impl Into<String>,
    ) {
        if sender.send(Event::diagnostic(scope, message)).is_err() {
            tracing::warn!("event bus unavailable for diagnostic");
        }
    }
}

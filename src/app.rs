//! Compiled workflow application.
//!
//! An [`App`] is the validated, executable form of a graph: the node
//! registry, the routing table, the entry point, and runtime configuration.
//! It also owns the merge barrier, the single place where node output is
//! folded into canonical state.

use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::instrument;

use crate::event_bus::{ChannelSink, Event, EventBus};
use crate::graphs::EdgeSpec;
use crate::node::{Node, NodePartial};
use crate::reducers::apply_partial;
use crate::runner::{AppRunner, RunnerError, RuntimeConfig};
use crate::state::ResearchState;
use crate::types::NodeKind;

/// Orchestrates graph execution and applies reducers at barriers.
///
/// `App` is produced by [`GraphBuilder::compile`](crate::graphs::GraphBuilder::compile)
/// and is immutable afterwards: execution never changes topology.
///
/// # Examples
///
/// ```rust,no_run
/// use factloom::graphs::GraphBuilder;
/// use factloom::state::ResearchState;
/// use factloom::types::NodeKind;
/// # struct MyNode;
/// # #[async_trait::async_trait]
/// # impl factloom::node::Node for MyNode {
/// #     async fn run(&self, _: factloom::state::StateSnapshot, _: factloom::node::NodeContext) -> Result<factloom::node::NodePartial, factloom::node::NodeError> {
/// #         Ok(factloom::node::NodePartial::default())
/// #     }
/// # }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let app = GraphBuilder::new()
///     .add_node(NodeKind::from("process"), MyNode)
///     .set_entry(NodeKind::from("process"))
///     .add_edge(NodeKind::from("process"), NodeKind::End)
///     .compile()?;
///
/// let final_state = app.invoke(ResearchState::new_with_topic("hello")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct App {
    nodes: FxHashMap<NodeKind, Arc<dyn Node>>,
    edges: FxHashMap<NodeKind, EdgeSpec>,
    entry: NodeKind,
    runtime_config: RuntimeConfig,
}

/// Result of applying a node's partial at a barrier.
#[derive(Debug, Clone, Default)]
pub struct BarrierOutcome {
    /// Channel identifiers that were updated, in declaration order.
    pub updated_channels: Vec<&'static str>,
}

impl App {
    /// Assembles an `App` from validated parts. Called by graph compilation.
    pub(crate) fn from_parts(
        nodes: FxHashMap<NodeKind, Arc<dyn Node>>,
        edges: FxHashMap<NodeKind, EdgeSpec>,
        entry: NodeKind,
        runtime_config: RuntimeConfig,
    ) -> Self {
        Self {
            nodes,
            edges,
            entry,
            runtime_config,
        }
    }

    /// Registered nodes, keyed by identifier.
    pub fn nodes(&self) -> &FxHashMap<NodeKind, Arc<dyn Node>> {
        &self.nodes
    }

    /// Routing table: one outgoing spec per node.
    pub fn edges(&self) -> &FxHashMap<NodeKind, EdgeSpec> {
        &self.edges
    }

    /// The node executed first.
    pub fn entry(&self) -> &NodeKind {
        &self.entry
    }

    /// Runtime configuration the graph was compiled with.
    pub fn runtime_config(&self) -> &RuntimeConfig {
        &self.runtime_config
    }

    /// Folds a node's partial update into the state at a merge barrier.
    ///
    /// Scalar channels are overwritten, the messages channel is appended
    /// to, and versions bump once per updated channel. An empty partial
    /// leaves the state untouched.
    #[instrument(skip(self, state, partial), fields(node = %node))]
    pub fn apply_barrier(
        &self,
        state: &mut ResearchState,
        node: &NodeKind,
        partial: &NodePartial,
    ) -> BarrierOutcome {
        let updated_channels = apply_partial(state, partial);
        if updated_channels.is_empty() {
            tracing::debug!(node = %node, "barrier: no channels updated");
        } else {
            tracing::debug!(node = %node, channels = ?updated_channels, "barrier: merged update");
        }
        BarrierOutcome { updated_channels }
    }

    /// Executes the workflow to completion with a stdout event bus.
    ///
    /// # Errors
    ///
    /// Returns a [`RunnerError`] if a node fails, routing resolves to an
    /// unmapped label, or the step ceiling is exceeded.
    pub async fn invoke(&self, state: ResearchState) -> Result<ResearchState, RunnerError> {
        let runner = AppRunner::new(self.clone(), EventBus::default());
        let (state, _reports) = runner.run(state).await?;
        Ok(state)
    }

    /// Executes the workflow, streaming events into `tx` as it runs.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`invoke`](Self::invoke).
    pub async fn invoke_with_channel(
        &self,
        state: ResearchState,
        tx: flume::Sender<Event>,
    ) -> Result<ResearchState, RunnerError> {
        let bus = EventBus::with_sink(ChannelSink::new(tx));
        let runner = AppRunner::new(self.clone(), bus);
        let (state, _reports) = runner.run(state).await?;
        Ok(state)
    }
}

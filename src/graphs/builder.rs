//! GraphBuilder implementation for constructing workflow graphs.

use rustc_hash::FxHashMap;
use std::sync::Arc;

use super::compilation::GraphCompileError;
use super::edges::{BranchPredicate, ConditionalEdge, EdgeSpec};
use crate::node::Node;
use crate::runner::RuntimeConfig;
use crate::types::NodeKind;

/// Builder for constructing workflow graphs with a fluent API.
///
/// `GraphBuilder` collects nodes, edges, and configuration, then validates
/// the whole structure at [`compile`](Self::compile). Structural mistakes
/// made while building (duplicate node names, a second edge from the same
/// source) are recorded as violations and reported from `compile`, so every
/// graph error surfaces before the first node ever runs.
///
/// # Required Configuration
///
/// Every graph must have:
/// - At least one executable node added via [`add_node`](Self::add_node)
/// - An entry point declared via [`set_entry`](Self::set_entry)
/// - Every node routed onward, ultimately reaching [`NodeKind::End`]
///
/// `NodeKind::End` is a virtual endpoint: route to it, never register it.
///
/// # Examples
///
/// ```
/// use factloom::graphs::GraphBuilder;
/// use factloom::types::NodeKind;
///
/// # struct MyNode;
/// # #[async_trait::async_trait]
/// # impl factloom::node::Node for MyNode {
/// #     async fn run(&self, _: factloom::state::StateSnapshot, _: factloom::node::NodeContext) -> Result<factloom::node::NodePartial, factloom::node::NodeError> {
/// #         Ok(factloom::node::NodePartial::default())
/// #     }
/// # }
/// let app = GraphBuilder::new()
///     .add_node(NodeKind::from("worker"), MyNode)
///     .set_entry(NodeKind::from("worker"))
///     .add_edge(NodeKind::from("worker"), NodeKind::End)
///     .compile();
/// assert!(app.is_ok());
/// ```
pub struct GraphBuilder {
    /// Registry of all nodes in the graph, keyed by their identifier.
    pub nodes: FxHashMap<NodeKind, Arc<dyn Node>>,
    /// Outgoing routing per source node.
    pub edges: FxHashMap<NodeKind, EdgeSpec>,
    /// Declared entry point, executed first.
    pub entry: Option<NodeKind>,
    /// Runtime configuration for the compiled application.
    pub runtime_config: RuntimeConfig,
    /// Structural violations observed while building, reported at compile.
    pub(super) violations: Vec<GraphCompileError>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Creates a new, empty graph builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: FxHashMap::default(),
            edges: FxHashMap::default(),
            entry: None,
            runtime_config: RuntimeConfig::default(),
            violations: Vec::new(),
        }
    }

    /// Adds a node to the graph.
    ///
    /// Each node must have a unique [`NodeKind`] identifier within the
    /// graph; registering the same identifier twice is a compile error.
    /// `NodeKind::End` is virtual and cannot be registered; an attempt is
    /// ignored with a warning.
    #[must_use]
    pub fn add_node(mut self, id: NodeKind, node: impl Node + 'static) -> Self {
        match id {
            NodeKind::End => {
                tracing::warn!(?id, "ignoring registration of virtual End node");
            }
            _ => {
                if self.nodes.contains_key(&id) {
                    self.violations
                        .push(GraphCompileError::DuplicateNode { node: id.clone() });
                } else {
                    self.nodes.insert(id, Arc::new(node));
                }
            }
        }
        self
    }

    /// Adds an unconditional edge from one node to another.
    ///
    /// A node has exactly one outgoing routing decision; a second edge from
    /// the same source (static or conditional) is a compile error.
    #[must_use]
    pub fn add_edge(mut self, from: NodeKind, to: NodeKind) -> Self {
        if self.edges.contains_key(&from) {
            self.violations
                .push(GraphCompileError::DuplicateEdge { from });
        } else {
            self.edges.insert(from, EdgeSpec::Direct(to));
        }
        self
    }

    /// Adds a conditional edge with a branch function and a route table.
    ///
    /// After `from` completes and its output is merged, `predicate` is
    /// evaluated against the fresh snapshot; the returned label selects the
    /// next node from `routes`.
    ///
    /// # Examples
    ///
    /// ```
    /// use factloom::graphs::{BranchPredicate, GraphBuilder};
    /// use factloom::types::NodeKind;
    /// use std::sync::Arc;
    ///
    /// # struct MyNode;
    /// # #[async_trait::async_trait]
    /// # impl factloom::node::Node for MyNode {
    /// #     async fn run(&self, _: factloom::state::StateSnapshot, _: factloom::node::NodeContext) -> Result<factloom::node::NodePartial, factloom::node::NodeError> {
    /// #         Ok(factloom::node::NodePartial::default())
    /// #     }
    /// # }
    /// let branch: BranchPredicate = Arc::new(|snapshot| {
    ///     if snapshot.extracted_facts.is_empty() {
    ///         "gather".to_string()
    ///     } else {
    ///         "done".to_string()
    ///     }
    /// });
    ///
    /// let builder = GraphBuilder::new()
    ///     .add_node(NodeKind::from("check"), MyNode)
    ///     .add_node(NodeKind::from("gather"), MyNode)
    ///     .set_entry(NodeKind::from("check"))
    ///     .add_conditional_edge(
    ///         NodeKind::from("check"),
    ///         branch,
    ///         [
    ///             ("gather".to_string(), NodeKind::from("gather")),
    ///             ("done".to_string(), NodeKind::End),
    ///         ],
    ///     )
    ///     .add_edge(NodeKind::from("gather"), NodeKind::from("check"));
    /// ```
    #[must_use]
    pub fn add_conditional_edge(
        mut self,
        from: NodeKind,
        predicate: BranchPredicate,
        routes: impl IntoIterator<Item = (String, NodeKind)>,
    ) -> Self {
        if self.edges.contains_key(&from) {
            self.violations
                .push(GraphCompileError::DuplicateEdge { from });
        } else {
            let edge = ConditionalEdge::new(from.clone(), predicate, routes);
            self.edges.insert(from, EdgeSpec::Conditional(edge));
        }
        self
    }

    /// Declares the node executed first.
    #[must_use]
    pub fn set_entry(mut self, entry: NodeKind) -> Self {
        self.entry = Some(entry);
        self
    }

    /// Configures runtime settings for the compiled application.
    #[must_use]
    pub fn with_runtime_config(mut self, runtime_config: RuntimeConfig) -> Self {
        self.runtime_config = runtime_config;
        self
    }
}

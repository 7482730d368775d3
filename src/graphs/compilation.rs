//! Graph compilation and structural validation.
//!
//! [`GraphBuilder::compile`] is the single gate between construction and
//! execution: every structural mistake a graph can carry is reported here,
//! before any node runs.

use miette::Diagnostic;
use thiserror::Error;

use crate::app::App;
use crate::types::NodeKind;

/// Errors detected while validating a graph at compile time.
#[derive(Debug, Error, Diagnostic)]
pub enum GraphCompileError {
    /// A node identifier was registered more than once.
    #[error("duplicate node registration: {node}")]
    #[diagnostic(
        code(factloom::graph::duplicate_node),
        help("Each node identifier may be registered exactly once.")
    )]
    DuplicateNode { node: NodeKind },

    /// An edge or the entry point references a node that was never
    /// registered. For an unregistered entry, `from` and `to` both name it.
    #[error("unknown node {to} referenced from {from}")]
    #[diagnostic(
        code(factloom::graph::unknown_node),
        help("Register the node with add_node, or route to NodeKind::End.")
    )]
    UnknownNode { from: NodeKind, to: NodeKind },

    /// A node already has an outgoing routing decision.
    #[error("duplicate outgoing edge from {from}")]
    #[diagnostic(
        code(factloom::graph::duplicate_edge),
        help("A node has exactly one outgoing edge, static or conditional.")
    )]
    DuplicateEdge { from: NodeKind },

    /// A registered node has no outgoing edge and can trap execution.
    #[error("node {node} has no outgoing edge")]
    #[diagnostic(
        code(factloom::graph::dangling_node),
        help("Every node needs a route onward, ultimately reaching End.")
    )]
    DanglingNode { node: NodeKind },

    /// No entry point was declared.
    #[error("graph entry point was never declared")]
    #[diagnostic(
        code(factloom::graph::missing_entry),
        help("Call set_entry with a registered node before compiling.")
    )]
    MissingEntry,
}

impl super::builder::GraphBuilder {
    /// Compiles the graph into an executable application.
    ///
    /// Validation covers, in order:
    /// - violations recorded while building (duplicate nodes, duplicate edges)
    /// - a declared entry point resolving to a registered node
    /// - every edge source and target resolving to a registered node
    ///   (`NodeKind::End` is always a valid target)
    /// - every registered node having an outgoing edge
    ///
    /// # Errors
    ///
    /// Returns the first [`GraphCompileError`] encountered.
    pub fn compile(mut self) -> Result<App, GraphCompileError> {
        if !self.violations.is_empty() {
            return Err(self.violations.remove(0));
        }

        let entry = match &self.entry {
            Some(entry) if self.nodes.contains_key(entry) => entry.clone(),
            // Declared but never registered: that is an unknown-node
            // reference, not a missing declaration.
            Some(entry) => {
                return Err(GraphCompileError::UnknownNode {
                    from: entry.clone(),
                    to: entry.clone(),
                });
            }
            None => return Err(GraphCompileError::MissingEntry),
        };

        for (from, spec) in &self.edges {
            if !self.nodes.contains_key(from) {
                return Err(GraphCompileError::UnknownNode {
                    from: from.clone(),
                    to: from.clone(),
                });
            }
            for to in spec.targets() {
                if !to.is_end() && !self.nodes.contains_key(to) {
                    return Err(GraphCompileError::UnknownNode {
                        from: from.clone(),
                        to: to.clone(),
                    });
                }
            }
        }

        // Deterministic reporting order for the dangling check.
        let mut registered: Vec<&NodeKind> = self.nodes.keys().collect();
        registered.sort_by_key(|kind| kind.encode());
        for node in registered {
            if !self.edges.contains_key(node) {
                return Err(GraphCompileError::DanglingNode { node: node.clone() });
            }
        }

        Ok(App::from_parts(
            self.nodes,
            self.edges,
            entry,
            self.runtime_config,
        ))
    }
}

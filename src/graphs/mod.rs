//! Graph definition and compilation for workflow execution.
//!
//! The entry point is [`GraphBuilder`], a fluent builder for declaring
//! nodes, edges, and the entry point, which compiles into an executable
//! [`App`](crate::app::App) after structural validation.
//!
//! # Core Concepts
//!
//! - **Nodes**: executable units of work implementing the
//!   [`Node`](crate::node::Node) trait
//! - **Edges**: one outgoing routing decision per node, either a static
//!   target or a branch function over a label table
//! - **Virtual End**: `NodeKind::End` terminates execution and is never
//!   registered as a node
//! - **Compilation**: structural validation and conversion to
//!   [`App`](crate::app::App), so a graph that compiles cannot route to a
//!   missing node
//!
//! # Quick Start
//!
//! ```
//! use factloom::graphs::GraphBuilder;
//! use factloom::node::{Node, NodeContext, NodeError, NodePartial};
//! use factloom::state::StateSnapshot;
//! use factloom::types::NodeKind;
//! use async_trait::async_trait;
//!
//! struct MyNode;
//!
//! #[async_trait]
//! impl Node for MyNode {
//!     async fn run(&self, _: StateSnapshot, _: NodeContext) -> Result<NodePartial, NodeError> {
//!         Ok(NodePartial::default())
//!     }
//! }
//!
//! let app = GraphBuilder::new()
//!     .add_node(NodeKind::from("process"), MyNode)
//!     .set_entry(NodeKind::from("process"))
//!     .add_edge(NodeKind::from("process"), NodeKind::End)
//!     .compile();
//! assert!(app.is_ok());
//! ```

mod builder;
mod compilation;
mod edges;

pub use builder::GraphBuilder;
pub use compilation::GraphCompileError;
pub use edges::{BranchPredicate, ConditionalEdge, EdgeSpec};

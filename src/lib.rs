//! # Factloom: Graph-driven Research Workflow Engine
//!
//! Factloom executes typed, stateful workflows as graphs: named nodes read
//! an immutable snapshot of the shared state, return partial updates, and a
//! deterministic merge barrier folds those updates back in with per-field
//! semantics. Routing between nodes is static or branch-function driven and
//! runs until it reaches the terminal `End` sentinel, bounded by a step
//! ceiling.
//!
//! ## Core Concepts
//!
//! - **Nodes**: async units of work that process state snapshots
//! - **State**: a fixed-field record of versioned channels, each carrying
//!   its own merge rule (overwrite for scalars, append for the message log)
//! - **Graph**: declarative workflow definition with conditional edges,
//!   validated entirely at compile time
//! - **Runner**: sequential execution with a hard step ceiling and
//!   structured event streaming
//! - **Pipelines**: a ready-made five-stage research pipeline and a
//!   tool-calling agent loop, written against provider boundary traits
//!
//! ## Quick Start
//!
//! ```
//! use factloom::{
//!     graphs::GraphBuilder,
//!     message::Message,
//!     node::{Node, NodeContext, NodeError, NodePartial},
//!     state::{ResearchState, StateSnapshot},
//!     types::NodeKind,
//! };
//! use async_trait::async_trait;
//!
//! struct GreetingNode;
//!
//! #[async_trait]
//! impl Node for GreetingNode {
//!     async fn run(
//!         &self,
//!         _snapshot: StateSnapshot,
//!         _ctx: NodeContext,
//!     ) -> Result<NodePartial, NodeError> {
//!         Ok(NodePartial::new().with_messages(vec![Message::assistant("Hello!")]))
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = GraphBuilder::new()
//!     .add_node(NodeKind::from("greet"), GreetingNode)
//!     .set_entry(NodeKind::from("greet"))
//!     .add_edge(NodeKind::from("greet"), NodeKind::End)
//!     .compile()?;
//!
//! let final_state = app.invoke(ResearchState::new_with_topic("greetings")).await?;
//! assert_eq!(final_state.messages.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Guide
//!
//! - [`types`] - node identifiers and the terminal sentinel
//! - [`message`] - conversation messages and tool calls
//! - [`channels`] - versioned channels with per-channel merge rules
//! - [`state`] - the workflow state record and snapshots
//! - [`node`] - the node trait and execution primitives
//! - [`reducers`] - the barrier's merge of partial updates
//! - [`graphs`] - workflow graph definition and compilation
//! - [`app`] - the compiled, executable workflow
//! - [`runner`] - sequential execution, step ceiling, error taxonomy
//! - [`pipelines`] - the research pipeline and the agent loop
//! - [`event_bus`] - structured event fan-out to pluggable sinks
//! - [`config`] - environment-backed provider credentials
//! - [`telemetry`] - tracing bootstrap for hosts

pub mod app;
pub mod channels;
pub mod config;
pub mod event_bus;
pub mod graphs;
pub mod message;
pub mod node;
pub mod pipelines;
pub mod reducers;
pub mod runner;
pub mod state;
pub mod telemetry;
pub mod types;
pub mod utils;

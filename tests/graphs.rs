mod common;
use common::*;

use std::sync::Arc;

use factloom::graphs::{BranchPredicate, GraphBuilder, GraphCompileError};
use factloom::types::NodeKind;

fn always_done() -> BranchPredicate {
    Arc::new(|_| "done".to_string())
}

#[test]
fn compile_accepts_minimal_graph() {
    let result = GraphBuilder::new()
        .add_node(NodeKind::from("a"), NoopNode)
        .set_entry(NodeKind::from("a"))
        .add_edge(NodeKind::from("a"), NodeKind::End)
        .compile();
    assert!(result.is_ok());
}

#[test]
fn compile_rejects_duplicate_node() {
    let result = GraphBuilder::new()
        .add_node(NodeKind::from("a"), NoopNode)
        .add_node(NodeKind::from("a"), SimpleMessageNode::new("again"))
        .set_entry(NodeKind::from("a"))
        .add_edge(NodeKind::from("a"), NodeKind::End)
        .compile();
    assert!(matches!(
        result,
        Err(GraphCompileError::DuplicateNode { node }) if node == NodeKind::from("a")
    ));
}

#[test]
fn compile_rejects_duplicate_static_edge() {
    let result = GraphBuilder::new()
        .add_node(NodeKind::from("a"), NoopNode)
        .add_node(NodeKind::from("b"), NoopNode)
        .set_entry(NodeKind::from("a"))
        .add_edge(NodeKind::from("a"), NodeKind::from("b"))
        .add_edge(NodeKind::from("a"), NodeKind::End)
        .add_edge(NodeKind::from("b"), NodeKind::End)
        .compile();
    assert!(matches!(
        result,
        Err(GraphCompileError::DuplicateEdge { from }) if from == NodeKind::from("a")
    ));
}

#[test]
fn compile_rejects_conditional_over_existing_edge() {
    let result = GraphBuilder::new()
        .add_node(NodeKind::from("a"), NoopNode)
        .set_entry(NodeKind::from("a"))
        .add_edge(NodeKind::from("a"), NodeKind::End)
        .add_conditional_edge(
            NodeKind::from("a"),
            always_done(),
            [("done".to_string(), NodeKind::End)],
        )
        .compile();
    assert!(matches!(result, Err(GraphCompileError::DuplicateEdge { .. })));
}

#[test]
fn compile_rejects_unknown_static_target() {
    let result = GraphBuilder::new()
        .add_node(NodeKind::from("a"), NoopNode)
        .set_entry(NodeKind::from("a"))
        .add_edge(NodeKind::from("a"), NodeKind::from("ghost"))
        .compile();
    assert!(matches!(
        result,
        Err(GraphCompileError::UnknownNode { from, to })
            if from == NodeKind::from("a") && to == NodeKind::from("ghost")
    ));
}

#[test]
fn compile_rejects_unknown_conditional_target() {
    let result = GraphBuilder::new()
        .add_node(NodeKind::from("a"), NoopNode)
        .set_entry(NodeKind::from("a"))
        .add_conditional_edge(
            NodeKind::from("a"),
            always_done(),
            [("done".to_string(), NodeKind::from("ghost"))],
        )
        .compile();
    assert!(matches!(result, Err(GraphCompileError::UnknownNode { .. })));
}

#[test]
fn compile_rejects_dangling_node() {
    let result = GraphBuilder::new()
        .add_node(NodeKind::from("a"), NoopNode)
        .add_node(NodeKind::from("stuck"), NoopNode)
        .set_entry(NodeKind::from("a"))
        .add_edge(NodeKind::from("a"), NodeKind::from("stuck"))
        .compile();
    assert!(matches!(
        result,
        Err(GraphCompileError::DanglingNode { node }) if node == NodeKind::from("stuck")
    ));
}

#[test]
fn compile_rejects_missing_entry() {
    let result = GraphBuilder::new()
        .add_node(NodeKind::from("a"), NoopNode)
        .add_edge(NodeKind::from("a"), NodeKind::End)
        .compile();
    assert!(matches!(result, Err(GraphCompileError::MissingEntry)));
}

#[test]
fn compile_rejects_unregistered_entry_as_unknown_node() {
    // Declaring an entry that was never registered is an unknown-node
    // reference, distinct from declaring no entry at all.
    let result = GraphBuilder::new()
        .add_node(NodeKind::from("a"), NoopNode)
        .set_entry(NodeKind::from("ghost"))
        .add_edge(NodeKind::from("a"), NodeKind::End)
        .compile();
    assert!(matches!(
        result,
        Err(GraphCompileError::UnknownNode { from, to })
            if from == NodeKind::from("ghost") && to == NodeKind::from("ghost")
    ));
}

#[test]
fn registering_end_is_ignored() {
    // End is virtual; registering it neither adds a node nor fails later
    // validation of an otherwise well-formed graph.
    let result = GraphBuilder::new()
        .add_node(NodeKind::End, NoopNode)
        .add_node(NodeKind::from("a"), NoopNode)
        .set_entry(NodeKind::from("a"))
        .add_edge(NodeKind::from("a"), NodeKind::End)
        .compile();
    let app = result.expect("graph should compile");
    assert_eq!(app.nodes().len(), 1);
}

#[test]
fn cycles_compile_successfully() {
    // Cycles are legal topology; the runner's step ceiling bounds them.
    let result = GraphBuilder::new()
        .add_node(NodeKind::from("a"), NoopNode)
        .add_node(NodeKind::from("b"), NoopNode)
        .set_entry(NodeKind::from("a"))
        .add_conditional_edge(
            NodeKind::from("a"),
            always_done(),
            [
                ("done".to_string(), NodeKind::End),
                ("again".to_string(), NodeKind::from("b")),
            ],
        )
        .add_edge(NodeKind::from("b"), NodeKind::from("a"))
        .compile();
    assert!(result.is_ok());
}

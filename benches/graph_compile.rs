//! Benchmarks for graph construction, compilation, and execution.
//!
//! These benchmarks measure:
//! - Building and compiling linear graphs of varying length
//! - Building and compiling graphs with conditional routing
//! - Running a compiled linear graph end to end

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use factloom::graphs::{BranchPredicate, GraphBuilder};
use factloom::node::{Node, NodeContext, NodeError, NodePartial};
use factloom::runner::RuntimeConfig;
use factloom::state::{ResearchState, StateSnapshot};
use factloom::types::NodeKind;
use tokio::runtime::Runtime;

/// A minimal no-op node for benchmarking graph structure operations.
struct BenchNode;

#[async_trait::async_trait]
impl Node for BenchNode {
    async fn run(&self, _: StateSnapshot, _: NodeContext) -> Result<NodePartial, NodeError> {
        Ok(NodePartial::default())
    }
}

/// Build a linear graph: node_0 -> node_1 -> ... -> node_{n-1} -> End
fn build_linear_graph(node_count: usize) -> GraphBuilder {
    let mut builder = GraphBuilder::new();

    for i in 0..node_count {
        builder = builder.add_node(NodeKind::Custom(format!("node_{i}")), BenchNode);
    }

    builder = builder.set_entry(NodeKind::Custom("node_0".into()));

    for i in 0..node_count.saturating_sub(1) {
        builder = builder.add_edge(
            NodeKind::Custom(format!("node_{i}")),
            NodeKind::Custom(format!("node_{}", i + 1)),
        );
    }

    builder.add_edge(
        NodeKind::Custom(format!("node_{}", node_count - 1)),
        NodeKind::End,
    )
}

/// Build a graph where every node routes through a conditional edge:
/// node_i branches to either node_{i+1} or End.
fn build_branching_graph(node_count: usize) -> GraphBuilder {
    let mut builder = GraphBuilder::new();

    for i in 0..node_count {
        builder = builder.add_node(NodeKind::Custom(format!("node_{i}")), BenchNode);
    }

    builder = builder.set_entry(NodeKind::Custom("node_0".into()));

    for i in 0..node_count {
        let predicate: BranchPredicate = Arc::new(|_| "next".to_string());
        let next = if i + 1 < node_count {
            NodeKind::Custom(format!("node_{}", i + 1))
        } else {
            NodeKind::End
        };
        builder = builder.add_conditional_edge(
            NodeKind::Custom(format!("node_{i}")),
            predicate,
            [("next".to_string(), next), ("stop".to_string(), NodeKind::End)],
        );
    }

    builder
}

fn bench_graph_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_compile");

    for size in [10, 50, 100, 200] {
        group.bench_with_input(BenchmarkId::new("linear", size), &size, |b, &size| {
            b.iter(|| {
                let builder = build_linear_graph(size);
                builder.compile().expect("compilation should succeed")
            });
        });
    }

    for size in [10, 50, 100] {
        group.bench_with_input(BenchmarkId::new("branching", size), &size, |b, &size| {
            b.iter(|| {
                let builder = build_branching_graph(size);
                builder.compile().expect("compilation should succeed")
            });
        });
    }

    group.finish();
}

fn bench_linear_run(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("linear_run");

    for size in [4, 16] {
        let app = build_linear_graph(size)
            .with_runtime_config(RuntimeConfig::default().with_max_steps(size as u64 + 1))
            .compile()
            .expect("compilation should succeed");

        // Stream events into a drained channel so the bench never measures
        // stdout writes.
        let (tx, rx) = flume::unbounded();

        group.bench_with_input(BenchmarkId::new("invoke", size), &app, |b, app| {
            b.to_async(&rt).iter(|| async {
                let state = app
                    .invoke_with_channel(ResearchState::new_with_topic("bench"), tx.clone())
                    .await
                    .expect("run should succeed");
                while rx.try_recv().is_ok() {}
                state
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_graph_compile, bench_linear_run);
criterion_main!(benches);

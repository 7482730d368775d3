//! Edge types and routing predicates for conditional graph flow.

use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

use crate::state::StateSnapshot;
use crate::types::NodeKind;

/// Branch function for conditional edge routing.
///
/// Evaluated against the post-merge [`StateSnapshot`] after the source node
/// completes, it returns a label that is looked up in the edge's route table.
/// A label with no mapped target halts the run with an error.
///
/// # Examples
///
/// ```
/// use factloom::graphs::BranchPredicate;
/// use std::sync::Arc;
///
/// let route_on_tool_call: BranchPredicate = Arc::new(|snapshot| {
///     match snapshot.last_message() {
///         Some(msg) if msg.requests_tool() => "tools".to_string(),
///         _ => "write".to_string(),
///     }
/// });
/// ```
pub type BranchPredicate = Arc<dyn Fn(&StateSnapshot) -> String + Send + Sync + 'static>;

/// A conditional edge that routes based on a branch function.
///
/// The predicate picks a label; the route table maps labels to target nodes.
/// Keeping the table explicit (rather than letting the predicate name nodes
/// directly) means every possible destination is visible to compile-time
/// validation.
#[derive(Clone)]
pub struct ConditionalEdge {
    from: NodeKind,
    predicate: BranchPredicate,
    routes: FxHashMap<String, NodeKind>,
}

impl ConditionalEdge {
    /// Creates a new conditional edge.
    pub fn new(
        from: impl Into<NodeKind>,
        predicate: BranchPredicate,
        routes: impl IntoIterator<Item = (String, NodeKind)>,
    ) -> Self {
        Self {
            from: from.into(),
            predicate,
            routes: routes.into_iter().collect(),
        }
    }

    /// Source node of this conditional edge.
    pub fn from(&self) -> &NodeKind {
        &self.from
    }

    /// Label-to-target route table.
    pub fn routes(&self) -> &FxHashMap<String, NodeKind> {
        &self.routes
    }

    /// Evaluate the branch function against a snapshot.
    ///
    /// Returns the chosen label and, when the label is mapped, its target.
    pub fn select(&self, snapshot: &StateSnapshot) -> (String, Option<&NodeKind>) {
        let label = (self.predicate)(snapshot);
        let target = self.routes.get(&label);
        (label, target)
    }
}

impl fmt::Debug for ConditionalEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalEdge")
            .field("from", &self.from)
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}

/// Outgoing routing for a node: exactly one of static or conditional.
#[derive(Clone, Debug)]
pub enum EdgeSpec {
    /// Unconditional edge to a fixed target.
    Direct(NodeKind),
    /// Branch-function routing over a label table.
    Conditional(ConditionalEdge),
}

impl EdgeSpec {
    /// All targets this spec can route to, for compile-time validation.
    pub fn targets(&self) -> Vec<&NodeKind> {
        match self {
            EdgeSpec::Direct(to) => vec![to],
            EdgeSpec::Conditional(edge) => edge.routes().values().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::state::ResearchState;

    #[test]
    fn test_select_known_and_unknown_labels() {
        let predicate: BranchPredicate = Arc::new(|snapshot| {
            if snapshot.messages.is_empty() {
                "empty".to_string()
            } else {
                "busy".to_string()
            }
        });
        let edge = ConditionalEdge::new(
            NodeKind::from("router"),
            predicate,
            vec![("empty".to_string(), NodeKind::End)],
        );

        let (label, target) = edge.select(&ResearchState::default().snapshot());
        assert_eq!(label, "empty");
        assert_eq!(target, Some(&NodeKind::End));

        let busy = ResearchState::builder()
            .with_message(Message::user("hi"))
            .build()
            .snapshot();
        let (label, target) = edge.select(&busy);
        assert_eq!(label, "busy");
        assert_eq!(target, None);
    }

    #[test]
    fn test_edge_spec_targets() {
        let direct = EdgeSpec::Direct(NodeKind::from("next"));
        assert_eq!(direct.targets(), vec![&NodeKind::from("next")]);
    }
}

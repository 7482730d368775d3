//! Merge semantics for folding node output into workflow state.
//!
//! Each state channel carries its reducer in its type: a
//! [`ScalarChannel`](crate::channels::ScalarChannel) overwrites, an
//! [`AppendChannel`](crate::channels::AppendChannel) concatenates. This
//! module wires a [`NodePartial`] to those channels: [`apply_partial`] visits
//! every addressed field, hands the update to the channel, and reports which
//! channels changed so the barrier can log the merge.
//!
//! A wrongly-typed update or an unknown channel name is not a runtime case
//! here. `NodePartial` has one typed field per channel, so those mistakes do
//! not get past the compiler.

use crate::node::NodePartial;
use crate::state::ResearchState;

/// Fold a node's partial update into the state.
///
/// Scalar fields are overwritten; the messages log is appended to. `None`
/// fields are untouched. Returns the names of the channels that changed,
/// in declaration order; an empty partial yields an empty list and leaves
/// every version unchanged.
///
/// # Examples
///
/// ```rust
/// use factloom::node::NodePartial;
/// use factloom::reducers::apply_partial;
/// use factloom::state::ResearchState;
///
/// let mut state = ResearchState::new_with_topic("t");
/// let updated = apply_partial(
///     &mut state,
///     &NodePartial::new().with_article("draft".to_string()),
/// );
/// assert_eq!(updated, vec!["article"]);
/// assert_eq!(state.article.get(), "draft");
/// ```
pub fn apply_partial(state: &mut ResearchState, update: &NodePartial) -> Vec<&'static str> {
    let mut updated = Vec::new();

    if let Some(messages) = &update.messages
        && !messages.is_empty()
    {
        state.messages.append(messages.clone());
        updated.push("messages");
    }
    if let Some(queries) = &update.search_queries {
        state.search_queries.overwrite(queries.clone());
        updated.push("search_queries");
    }
    if let Some(results) = &update.search_results {
        state.search_results.overwrite(results.clone());
        updated.push("search_results");
    }
    if let Some(facts) = &update.extracted_facts {
        state.extracted_facts.overwrite(facts.clone());
        updated.push("extracted_facts");
    }
    if let Some(article) = &update.article {
        state.article.overwrite(article.clone());
        updated.push("article");
    }
    if let Some(result) = &update.fact_check_result {
        state.fact_check_result.overwrite(result.clone());
        updated.push("fact_check_result");
    }

    updated
}

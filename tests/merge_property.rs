//! Property tests for the barrier's merge semantics.

use proptest::prelude::*;

use factloom::message::Message;
use factloom::node::NodePartial;
use factloom::reducers::apply_partial;
use factloom::state::ResearchState;

/// One merge's worth of updates, as data.
#[derive(Clone, Debug)]
struct UpdateSpec {
    messages: Option<Vec<String>>,
    article: Option<String>,
}

fn update_strategy() -> impl Strategy<Value = UpdateSpec> {
    (
        prop::option::of(prop::collection::vec("[a-z]{1,8}", 0..4)),
        prop::option::of("[a-z]{0,12}"),
    )
        .prop_map(|(messages, article)| UpdateSpec { messages, article })
}

fn to_partial(spec: &UpdateSpec) -> NodePartial {
    let mut partial = NodePartial::new();
    if let Some(messages) = &spec.messages {
        partial = partial.with_messages(messages.iter().map(|m| Message::assistant(m.as_str())).collect());
    }
    if let Some(article) = &spec.article {
        partial = partial.with_article(article.clone());
    }
    partial
}

proptest! {
    /// The message log is append-only: every merged message survives, in
    /// merge order, behind everything merged before it.
    #[test]
    fn prop_messages_append_only(specs in prop::collection::vec(update_strategy(), 0..12)) {
        let mut state = ResearchState::default();
        let mut expected: Vec<String> = Vec::new();

        for spec in &specs {
            if let Some(messages) = &spec.messages {
                expected.extend(messages.iter().cloned());
            }
            apply_partial(&mut state, &to_partial(spec));
        }

        let merged: Vec<String> = state
            .messages
            .entries()
            .iter()
            .map(|m| m.content.clone())
            .collect();
        prop_assert_eq!(merged, expected);
    }

    /// A scalar channel holds exactly the last merged value.
    #[test]
    fn prop_scalar_last_writer_wins(specs in prop::collection::vec(update_strategy(), 0..12)) {
        let mut state = ResearchState::default();
        let mut last_article: Option<String> = None;
        let mut article_merges: u32 = 0;

        for spec in &specs {
            if let Some(article) = &spec.article {
                last_article = Some(article.clone());
                article_merges += 1;
            }
            apply_partial(&mut state, &to_partial(spec));
        }

        prop_assert_eq!(state.article.get(), &last_article.unwrap_or_default());
        prop_assert_eq!(state.article.version(), article_merges);
    }

    /// Versions bump once per merge that addressed the channel with
    /// content, never otherwise.
    #[test]
    fn prop_version_bumps_match_updates(specs in prop::collection::vec(update_strategy(), 0..12)) {
        let mut state = ResearchState::default();
        let mut message_merges: u32 = 0;

        for spec in &specs {
            if matches!(&spec.messages, Some(m) if !m.is_empty()) {
                message_merges += 1;
            }
            apply_partial(&mut state, &to_partial(spec));
        }

        prop_assert_eq!(state.messages.version(), message_merges);
    }
}

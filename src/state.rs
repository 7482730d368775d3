//! State management for the factloom workflow engine.
//!
//! Workflow state is a fixed-field record, [`ResearchState`]: every field the
//! pipelines read or write is declared here, together with its merge
//! semantics. Scalar fields live in a [`ScalarChannel`] (last writer wins);
//! the conversation log lives in an [`AppendChannel`] (concatenate, never
//! truncate). Versions are bumped only by the merge barrier.
//!
//! Nodes never touch `ResearchState` directly. They receive a cloned
//! [`StateSnapshot`] and return a [`NodePartial`](crate::node::NodePartial);
//! the barrier folds the partial back in.
//!
//! # Examples
//!
//! ```rust
//! use factloom::state::ResearchState;
//!
//! let state = ResearchState::new_with_topic("rust async runtimes");
//! let snapshot = state.snapshot();
//! assert_eq!(snapshot.topic, "rust async runtimes");
//! assert_eq!(snapshot.messages.len(), 1);
//! ```

use crate::channels::{AppendChannel, ScalarChannel};
use crate::message::Message;

/// The main state container for workflow execution.
///
/// Each field is an independent versioned channel. Scalar channels are
/// replaced wholesale when a node produces an update for them; the messages
/// channel only ever grows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResearchState {
    /// Research topic driving the run. Seeded at construction.
    pub topic: ScalarChannel<String>,
    /// Conversation log, append-only.
    pub messages: AppendChannel<Message>,
    /// Search queries produced by the query planner.
    pub search_queries: ScalarChannel<Vec<String>>,
    /// Raw search results gathered by the researcher.
    pub search_results: ScalarChannel<String>,
    /// Facts distilled from the search results.
    pub extracted_facts: ScalarChannel<Vec<String>>,
    /// Drafted article text.
    pub article: ScalarChannel<String>,
    /// Verdict from the fact-checking pass.
    pub fact_check_result: ScalarChannel<String>,
}

/// Immutable snapshot of workflow state at a specific point in time.
///
/// Snapshots carry data only, no version counters: nodes have no business
/// reasoning about channel versions, and keeping them out of the snapshot
/// keeps that temptation out of reach. Snapshots are created by
/// [`ResearchState::snapshot`] and handed to nodes on each invocation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateSnapshot {
    /// Research topic at snapshot time.
    pub topic: String,
    /// Conversation log at snapshot time, oldest first.
    pub messages: Vec<Message>,
    /// Planned search queries.
    pub search_queries: Vec<String>,
    /// Gathered search results.
    pub search_results: String,
    /// Extracted facts.
    pub extracted_facts: Vec<String>,
    /// Drafted article.
    pub article: String,
    /// Fact-check verdict.
    pub fact_check_result: String,
}

impl ResearchState {
    /// Creates a new state seeded with a topic and a matching user message.
    ///
    /// This is the primary constructor for starting workflow execution:
    /// the topic channel and the messages channel start at version 1, every
    /// other channel starts empty at version 0.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use factloom::state::ResearchState;
    ///
    /// let state = ResearchState::new_with_topic("ownership in Rust");
    /// assert_eq!(state.topic.get(), "ownership in Rust");
    /// assert_eq!(state.messages.len(), 1);
    /// assert_eq!(state.messages.entries()[0].role, "user");
    /// ```
    pub fn new_with_topic(topic: &str) -> Self {
        Self {
            topic: ScalarChannel::seeded(topic.to_string()),
            messages: AppendChannel::seeded(vec![Message::user(format!(
                "Research this topic: {topic}"
            ))]),
            ..Self::default()
        }
    }

    /// Creates a builder for constructing state with a fluent API.
    ///
    /// Useful for tests and for resuming a run with pre-populated fields.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use factloom::state::ResearchState;
    ///
    /// let state = ResearchState::builder()
    ///     .with_topic("borrow checker")
    ///     .with_search_queries(vec!["borrow checker rules".to_string()])
    ///     .build();
    /// assert_eq!(state.snapshot().search_queries.len(), 1);
    /// ```
    pub fn builder() -> ResearchStateBuilder {
        ResearchStateBuilder::default()
    }

    /// Creates an immutable snapshot of the current state.
    ///
    /// Clones every channel's data; the snapshot is fully independent of
    /// later mutations.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            topic: self.topic.snapshot(),
            messages: self.messages.snapshot(),
            search_queries: self.search_queries.snapshot(),
            search_results: self.search_results.snapshot(),
            extracted_facts: self.extracted_facts.snapshot(),
            article: self.article.snapshot(),
            fact_check_result: self.fact_check_result.snapshot(),
        }
    }
}

impl StateSnapshot {
    /// Last message in the conversation log, if any.
    ///
    /// Branch predicates lean on this to inspect the most recent assistant
    /// turn for a pending tool call.
    #[must_use]
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// Builder for constructing [`ResearchState`] with a fluent API.
#[derive(Debug, Default)]
pub struct ResearchStateBuilder {
    topic: Option<String>,
    messages: Vec<Message>,
    search_queries: Option<Vec<String>>,
    search_results: Option<String>,
    extracted_facts: Option<Vec<String>>,
    article: Option<String>,
    fact_check_result: Option<String>,
}

impl ResearchStateBuilder {
    /// Sets the research topic.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Appends a message to the initial conversation log.
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Seeds the planned search queries.
    pub fn with_search_queries(mut self, queries: Vec<String>) -> Self {
        self.search_queries = Some(queries);
        self
    }

    /// Seeds the gathered search results.
    pub fn with_search_results(mut self, results: impl Into<String>) -> Self {
        self.search_results = Some(results.into());
        self
    }

    /// Seeds the extracted facts.
    pub fn with_extracted_facts(mut self, facts: Vec<String>) -> Self {
        self.extracted_facts = Some(facts);
        self
    }

    /// Seeds the drafted article.
    pub fn with_article(mut self, article: impl Into<String>) -> Self {
        self.article = Some(article.into());
        self
    }

    /// Seeds the fact-check verdict.
    pub fn with_fact_check_result(mut self, result: impl Into<String>) -> Self {
        self.fact_check_result = Some(result.into());
        self
    }

    /// Builds the final `ResearchState`.
    ///
    /// Seeded channels start at version 1; untouched channels start at
    /// version 0 with default contents.
    pub fn build(self) -> ResearchState {
        let mut state = ResearchState::default();
        if let Some(topic) = self.topic {
            state.topic = ScalarChannel::seeded(topic);
        }
        if !self.messages.is_empty() {
            state.messages = AppendChannel::seeded(self.messages);
        }
        if let Some(queries) = self.search_queries {
            state.search_queries = ScalarChannel::seeded(queries);
        }
        if let Some(results) = self.search_results {
            state.search_results = ScalarChannel::seeded(results);
        }
        if let Some(facts) = self.extracted_facts {
            state.extracted_facts = ScalarChannel::seeded(facts);
        }
        if let Some(article) = self.article {
            state.article = ScalarChannel::seeded(article);
        }
        if let Some(result) = self.fact_check_result {
            state.fact_check_result = ScalarChannel::seeded(result);
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_with_topic_seeds_topic_and_message() {
        let state = ResearchState::new_with_topic("test topic");
        let snapshot = state.snapshot();
        assert_eq!(snapshot.topic, "test topic");
        assert_eq!(snapshot.messages.len(), 1);
        assert!(snapshot.messages[0].content.contains("test topic"));
        assert_eq!(state.topic.version(), 1);
        assert_eq!(state.search_queries.version(), 0);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut state = ResearchState::new_with_topic("t");
        let snapshot = state.snapshot();
        state.article.overwrite("draft".to_string());
        assert_eq!(snapshot.article, "");
        assert_eq!(state.article.get(), "draft");
    }

    #[test]
    fn test_builder_seeds_versions() {
        let state = ResearchState::builder()
            .with_topic("t")
            .with_message(Message::user("hi"))
            .with_article("a")
            .build();
        assert_eq!(state.topic.version(), 1);
        assert_eq!(state.messages.version(), 1);
        assert_eq!(state.article.version(), 1);
        assert_eq!(state.fact_check_result.version(), 0);
    }

    #[test]
    fn test_last_message() {
        let snapshot = ResearchState::builder()
            .with_message(Message::user("first"))
            .with_message(Message::assistant("second"))
            .build()
            .snapshot();
        assert_eq!(snapshot.last_message().unwrap().content, "second");
    }
}

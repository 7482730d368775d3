//! Conversation messages threaded through workflow state.
//!
//! Messages accumulate in the `messages` channel of
//! [`ResearchState`](crate::state::ResearchState): they are append-only,
//! merged by concatenation, and never overwritten. A message optionally
//! carries a [`ToolCall`] request, which is how an assistant turn signals
//! that the workflow should route to a tool-executing node.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single conversation turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the author, one of the [`roles`] constants.
    pub role: String,
    /// Text content of the turn.
    pub content: String,
    /// Tool invocation requested by this turn, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCall>,
}

/// A tool invocation requested by an assistant message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to invoke.
    pub name: String,
    /// Structured arguments for the invocation.
    pub arguments: Value,
}

/// Role constants for [`Message::role`].
pub mod roles {
    pub const USER: &str = "user";
    pub const ASSISTANT: &str = "assistant";
    pub const SYSTEM: &str = "system";
    pub const TOOL: &str = "tool";
}

impl Message {
    /// Construct a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: roles::USER.to_string(),
            content: content.into(),
            tool_call: None,
        }
    }

    /// Construct an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: roles::ASSISTANT.to_string(),
            content: content.into(),
            tool_call: None,
        }
    }

    /// Construct a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: roles::SYSTEM.to_string(),
            content: content.into(),
            tool_call: None,
        }
    }

    /// Construct a tool-result message.
    pub fn tool(content: impl Into<String>) -> Self {
        Self {
            role: roles::TOOL.to_string(),
            content: content.into(),
            tool_call: None,
        }
    }

    /// Attach a tool invocation request to this message.
    #[must_use]
    pub fn with_tool_call(mut self, name: impl Into<String>, arguments: Value) -> Self {
        self.tool_call = Some(ToolCall {
            name: name.into(),
            arguments,
        });
        self
    }

    /// Returns `true` if this message requests a tool invocation.
    #[must_use]
    pub fn requests_tool(&self) -> bool {
        self.tool_call.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constructors_set_roles() {
        assert_eq!(Message::user("q").role, roles::USER);
        assert_eq!(Message::assistant("a").role, roles::ASSISTANT);
        assert_eq!(Message::system("s").role, roles::SYSTEM);
        assert_eq!(Message::tool("t").role, roles::TOOL);
    }

    #[test]
    fn test_tool_call_attachment() {
        let msg = Message::assistant("searching")
            .with_tool_call("web_search", json!({"query": "rust"}));
        assert!(msg.requests_tool());
        let call = msg.tool_call.unwrap();
        assert_eq!(call.name, "web_search");
        assert_eq!(call.arguments["query"], "rust");
    }

    #[test]
    fn test_tool_call_omitted_from_json_when_absent() {
        let json = serde_json::to_string(&Message::user("hi")).unwrap();
        assert!(!json.contains("tool_call"));
    }
}

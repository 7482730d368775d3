//! Core identifier types for the factloom workflow engine.
//!
//! A workflow graph routes between nodes identified by [`NodeKind`]. The
//! engine reserves a single virtual identifier, [`NodeKind::End`], as the
//! terminal sentinel: routing to it completes the run. Every executable node
//! is a [`NodeKind::Custom`] with a caller-chosen name; the entry point is
//! declared explicitly on the builder rather than through a virtual start
//! node.
//!
//! # Examples
//!
//! ```rust
//! use factloom::types::NodeKind;
//!
//! let writer = NodeKind::Custom("writer".to_string());
//! assert_eq!(writer.encode(), "Custom:writer");
//! assert_eq!(NodeKind::decode("End"), NodeKind::End);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a node within a workflow graph.
///
/// `NodeKind` is a closed, tagged identifier: either the terminal sentinel
/// or a named custom node. Keeping the sentinel a distinct variant (rather
/// than a magic string) lets the compiler and the runner match on it
/// exhaustively.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Terminal sentinel that completes workflow execution.
    ///
    /// `End` is virtual: it has no implementation, is never executed, and is
    /// the only valid target without a registered node behind it.
    End,

    /// Custom node identified by a user-defined string.
    ///
    /// The string should be descriptive and unique within the workflow.
    Custom(String),
}

impl NodeKind {
    /// Encode a `NodeKind` into its stable string form.
    ///
    /// - `End` → `"End"`
    /// - `Custom("x")` → `"Custom:x"`
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            NodeKind::End => "End".to_string(),
            NodeKind::Custom(s) => format!("Custom:{s}"),
        }
    }

    /// Decode a string form back into a `NodeKind`.
    ///
    /// Unrecognized formats fall back to `Custom(s)` so logs and persisted
    /// labels round-trip without a hard failure.
    pub fn decode(s: &str) -> Self {
        if s == "End" {
            NodeKind::End
        } else if let Some(rest) = s.strip_prefix("Custom:") {
            NodeKind::Custom(rest.to_string())
        } else {
            NodeKind::Custom(s.to_string())
        }
    }

    /// Returns `true` if this is the terminal sentinel.
    #[must_use]
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }

    /// Returns `true` if this is a custom node.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::End => write!(f, "End"),
            Self::Custom(name) => write!(f, "{name}"),
        }
    }
}

// Developer experience: allow string literals where a NodeKind is expected.
impl From<&str> for NodeKind {
    fn from(s: &str) -> Self {
        match s {
            "End" => NodeKind::End,
            other => NodeKind::Custom(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let kinds = vec![NodeKind::End, NodeKind::Custom("writer".into())];
        for kind in kinds {
            assert_eq!(NodeKind::decode(&kind.encode()), kind);
        }
    }

    #[test]
    fn test_decode_unknown_falls_back_to_custom() {
        assert_eq!(
            NodeKind::decode("mystery"),
            NodeKind::Custom("mystery".to_string())
        );
    }

    #[test]
    fn test_from_str_recognizes_sentinel() {
        assert_eq!(NodeKind::from("End"), NodeKind::End);
        assert_eq!(
            NodeKind::from("researcher"),
            NodeKind::Custom("researcher".to_string())
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(NodeKind::End.to_string(), "End");
        assert_eq!(NodeKind::Custom("a".into()).to_string(), "a");
    }

    #[test]
    fn test_predicates() {
        assert!(NodeKind::End.is_end());
        assert!(!NodeKind::End.is_custom());
        assert!(NodeKind::Custom("x".into()).is_custom());
    }
}

//! Versioned state channels with per-channel merge semantics.
//!
//! Workflow state is a fixed set of named channels. Each channel carries a
//! value and a version counter; the version is bumped only by the merge
//! barrier when an update actually lands, never by in-place mutation during
//! node execution (nodes only ever see cloned snapshots).
//!
//! Two channel shapes cover the engine's merge semantics:
//!
//! - [`ScalarChannel`]: last-writer-wins. An update replaces the value.
//! - [`AppendChannel`]: append-only log. Updates are concatenated onto the
//!   existing entries in arrival order; history is never truncated.

use serde::{Deserialize, Serialize};

/// A last-writer-wins channel holding a single value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalarChannel<T> {
    value: T,
    version: u32,
}

impl<T> ScalarChannel<T> {
    /// Create a channel seeded with `value` at version 1.
    pub fn seeded(value: T) -> Self {
        Self { value, version: 1 }
    }

    /// Current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Current version.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Replace the value and bump the version. Barrier use only.
    pub fn overwrite(&mut self, value: T) {
        self.value = value;
        self.version += 1;
    }

    /// Clone out the current value.
    pub fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.value.clone()
    }
}

/// An append-only channel holding an ordered log of entries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppendChannel<T> {
    entries: Vec<T>,
    version: u32,
}

impl<T> Default for AppendChannel<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            version: 0,
        }
    }
}

impl<T> AppendChannel<T> {
    /// Create a channel seeded with `entries` at version 1.
    pub fn seeded(entries: Vec<T>) -> Self {
        Self {
            entries,
            version: 1,
        }
    }

    /// Current entries, oldest first.
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Number of entries in the log.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current version.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Concatenate `updates` onto the log and bump the version.
    /// Barrier use only. An empty update slice is a no-op: no bump.
    pub fn append(&mut self, updates: Vec<T>) {
        if updates.is_empty() {
            return;
        }
        self.entries.extend(updates);
        self.version += 1;
    }

    /// Clone out the current log.
    pub fn snapshot(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.entries.clone()
    }
}

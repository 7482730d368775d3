//! Small shared helpers.

use uuid::Uuid;

/// Generates identifiers for workflow runs.
#[derive(Clone, Debug, Default)]
pub struct IdGenerator;

impl IdGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate a unique, sortable-enough run id: `run-<uuid4>`.
    #[must_use]
    pub fn generate_run_id(&self) -> String {
        format!("run-{}", Uuid::new_v4())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_ids_are_unique() {
        let generator = IdGenerator::new();
        let a = generator.generate_run_id();
        let b = generator.generate_run_id();
        assert_ne!(a, b);
        assert!(a.starts_with("run-"));
    }
}

//! Storage result types
//!
//! Defines result structures returned by storage operations.

use serde::Serialize;
use std::collections::BTreeMap;

/// File count per location name
pub type FolderStats = BTreeMap<String, usize>;

/// One item of a batch operation that did not complete
#[derive(Debug, Clone, Serialize)]
pub struct FailedItem {
    pub filename: String,
    /// Underlying cause; logged server-side, never serialized to clients
    #[serde(skip)]
    pub cause: String,
}

/// Per-item record of a bulk operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<FailedItem>,
}

impl BatchOutcome {
    pub fn record_success(&mut self, filename: impl Into<String>) {
        self.succeeded.push(filename.into());
    }

    pub fn record_failure(&mut self, filename: impl Into<String>, cause: impl ToString) {
        self.failed.push(FailedItem {
            filename: filename.into(),
            cause: cause.to_string(),
        });
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn failed_names(&self) -> Vec<&str> {
        self.failed.iter().map(|item| item.filename.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cause_is_not_serialized() {
        let mut outcome = BatchOutcome::default();
        outcome.record_success("a.png");
        outcome.record_failure("b.png", "EACCES on /srv/uploads/4/b.png");

        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("b.png"));
        assert!(!json.contains("EACCES"));
        assert_eq!(outcome.total(), 2);
        assert!(!outcome.is_complete());
    }
}

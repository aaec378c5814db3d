//! Request and response types for search index operations.

use crate::errors::SearchIndexError;

/// Result of a batch operation for a single document.
///
/// This struct represents the outcome of a single operation within a batch. It
/// indicates whether the operation succeeded and includes error details if it failed.
#[derive(Debug, Clone)]
pub struct BatchOperationResult {
    /// The document id.
    pub object_id: String,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error if the operation failed.
    pub error: Option<SearchIndexError>,
}

impl BatchOperationResult {
    pub fn succeeded(object_id: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(object_id: impl Into<String>, error: SearchIndexError) -> Self {
        Self {
            object_id: object_id.into(),
            success: false,
            error: Some(error),
        }
    }
}

/// Summary of a batch operation containing aggregate statistics and individual results.
///
/// This struct provides a complete overview of a bulk operation, including the total
/// number of items processed, how many succeeded and failed, and detailed results for
/// each individual item. This allows callers to handle partial failures gracefully.
#[derive(Debug, Clone)]
pub struct BatchOperationSummary {
    /// Total number of items in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each item.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// Summary of a batch with nothing in it.
    pub fn empty() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            results: Vec::new(),
        }
    }

    /// Build a summary by counting individual results.
    pub fn from_results(results: Vec<BatchOperationResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// Merge another summary into this one.
    pub fn absorb(&mut self, other: BatchOperationSummary) {
        self.total += other.total;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.results.extend(other.results);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_results_counts() {
        let summary = BatchOperationSummary::from_results(vec![
            BatchOperationResult::succeeded("1"),
            BatchOperationResult::failed("2", SearchIndexError::index("mapping conflict")),
            BatchOperationResult::succeeded("3"),
        ]);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_absorb() {
        let mut summary = BatchOperationSummary::empty();
        summary.absorb(BatchOperationSummary::from_results(vec![
            BatchOperationResult::succeeded("1"),
        ]));
        summary.absorb(BatchOperationSummary::from_results(vec![
            BatchOperationResult::failed("2", SearchIndexError::index("boom")),
        ]));

        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.results.len(), 2);
    }
}

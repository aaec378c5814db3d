//! Configuration types for the SearchIndexService.

use std::time::Duration;

/// Default bound on a single backend call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bound on one promotion. Covers the clone, its health wait and the alias swap.
pub const DEFAULT_PROMOTION_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for the SearchIndexService.
///
/// This struct allows customization of service behavior, particularly around batch
/// operation limits and backend call timeouts. Use this to control resource usage and
/// prevent accidentally sending overly large batches to the search index backend.
#[derive(Debug, Clone)]
pub struct SearchIndexServiceConfig {
    /// Maximum number of documents allowed in a single batch operation.
    ///
    /// Set to `None` to disable the limit (not recommended for production).
    /// Defaults to 1000 if not specified.
    pub max_batch_size: Option<usize>,

    /// Upper bound for one backend call. A call exceeding it is reported as
    /// `SearchIndexError::Timeout`.
    pub request_timeout: Duration,

    /// Upper bound for one promotion. Must exceed the provider's own waits so an
    /// in-flight promotion is never cut off between its steps.
    pub promotion_timeout: Duration,
}

impl Default for SearchIndexServiceConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Some(1000),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            promotion_timeout: DEFAULT_PROMOTION_TIMEOUT,
        }
    }
}

impl SearchIndexServiceConfig {
    /// Create a config with no batch size limit.
    ///
    /// # Warning
    ///
    /// Use with caution. Removing batch size limits can lead to memory issues
    /// and timeouts when processing very large batches. Not recommended for production.
    pub fn unlimited() -> Self {
        Self {
            max_batch_size: None,
            ..Self::default()
        }
    }

    /// Create a config with a custom batch size limit.
    ///
    /// # Arguments
    ///
    /// * `max_batch_size` - Maximum number of documents allowed in a single batch operation
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: Some(max_batch_size),
            ..Self::default()
        }
    }

    /// Override the backend call timeout.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Override the promotion timeout.
    pub fn with_promotion_timeout(mut self, promotion_timeout: Duration) -> Self {
        self.promotion_timeout = promotion_timeout;
        self
    }
}

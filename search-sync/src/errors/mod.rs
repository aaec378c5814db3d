//! Error types for the search sync core.

use search_sync_repository::{ContentRepositoryError, SearchIndexError};
use thiserror::Error;

/// Errors that can occur while indexing, promoting, or re-ranking.
#[derive(Error, Debug, Clone)]
pub enum SyncError {
    /// Error from the search backend.
    #[error("Search index error: {0}")]
    SearchIndexError(#[from] SearchIndexError),

    /// Error from the host content repository.
    #[error("Content repository error: {0}")]
    ContentError(#[from] ContentRepositoryError),

    /// Input rejected before any side effect.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from the loader component.
    #[error("Loader error: {0}")]
    LoaderError(String),
}

impl SyncError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a loader error.
    pub fn loader(msg: impl Into<String>) -> Self {
        Self::LoaderError(msg.into())
    }
}

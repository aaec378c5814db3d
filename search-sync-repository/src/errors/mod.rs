//! Error types for the search sync repository.
//!
//! This module provides one error type per collaborator: the search backend and
//! the host content repository.

mod content_repository_error;
mod search_index_error;

pub use content_repository_error::ContentRepositoryError;
pub use search_index_error::SearchIndexError;

//! Interface definitions for the collaborators of the sync core.
//!
//! This module defines the abstract traits that allow for dependency injection and
//! swappable implementations of the search backend, the content repository, and the
//! config/state context.

mod config_context;
mod content_repository;
mod search_index_provider;

pub use config_context::ConfigContext;
pub use content_repository::ContentRepository;
pub use search_index_provider::SearchIndexProvider;

//! OpenSearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using OpenSearch as the backend.

mod index_config;
mod provider;

pub use index_config::{generation_index_name, get_index_settings, IndexConfig};
pub use provider::OpenSearchProvider;

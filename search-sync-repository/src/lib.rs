//! # Search Sync Repository
//!
//! This crate provides traits and implementations for the collaborators of the
//! search sync core: the search backend, the host content repository, and the
//! config/state context. It includes a concrete OpenSearch search backend, a
//! PostgreSQL content repository, and an in-memory config context.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod opensearch;
pub mod postgres;
pub mod service;
pub mod types;
pub mod utils;

pub use config::SearchIndexServiceConfig;
pub use errors::{ContentRepositoryError, SearchIndexError};
pub use interfaces::{ConfigContext, ContentRepository, SearchIndexProvider};
pub use memory::InMemoryConfigContext;
pub use opensearch::OpenSearchProvider;
pub use postgres::PostgresContentRepository;
pub use service::SearchIndexService;
pub use types::{BatchOperationResult, BatchOperationSummary};
pub use utils::parse_object_id;

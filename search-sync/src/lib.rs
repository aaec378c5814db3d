//! # Search Sync
//!
//! Keeps the host content repository's search data in an external OpenSearch
//! index and hands search ranking over to it.
//!
//! ## Architecture
//!
//! Indexing is driven from outside: a client sends control tokens and the
//! dispatcher routes each one to the matching unit.
//!
//! 1. **Dispatcher**: Parses control tokens and routes them
//! 2. **Indexer**: Fills staging indices per batch and promotes them to live
//! 3. **Processor**: Projects content items and terms into search documents
//! 4. **Loader**: Submits documents to the search backend in bounded chunks
//! 5. **Query**: Delegates native search queries and re-ranks the results
//!
//! ## Modules
//!
//! - [`config`]: Configuration and dependency initialization
//! - [`dispatcher`]: Control token parsing and routing
//! - [`indexer`]: Batch, taxonomy, and promotion units
//! - [`processor`]: Transforms content into documents
//! - [`loader`]: Indexes documents into OpenSearch
//! - [`query`]: Query delegation and re-ranking
//! - [`server`]: HTTP surface
//! - [`errors`]: Error types for the sync core

pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod indexer;
pub mod loader;
pub mod processor;
pub mod query;
pub mod server;

pub use config::Dependencies;
pub use dispatcher::{BatchDispatcher, ControlMessage, DispatchReport, ReindexPlan};
pub use errors::SyncError;
pub use query::{ListingExecutor, QueryDelegator};

use thiserror::Error;

/// Errors that can occur during service initialization or execution.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Sync error.
    #[error("Sync error: {0}")]
    SyncError(#[from] SyncError),

    /// HTTP server error.
    #[error("Server error: {0}")]
    ServerError(String),
}

impl ServiceError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a server error.
    pub fn server(msg: impl Into<String>) -> Self {
        Self::ServerError(msg.into())
    }
}

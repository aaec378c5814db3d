//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search backend operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;
use search_sync_shared::{IndexableDocument, SearchQuery, SearchResponse};

use crate::errors::SearchIndexError;
use crate::types::BatchOperationSummary;

/// Abstracts the underlying search index implementation (OpenSearch, Elasticsearch, etc.).
///
/// This trait works with backend index names; mapping index handles to names is the job of
/// `SearchIndexService`. Implementations are injected into `SearchIndexService` to enable
/// dependency injection and easy testing with mock implementations.
///
/// All methods return `Result<T, SearchIndexError>` for consistent error handling across
/// different backend implementations.
///
/// # Live and staging indices
///
/// A live name is a stable name readers query, for example an alias over a concrete
/// generation index. A staging name is a plain index written by batches and consumed by
/// `promote`. Readers of a live name must never observe a partially promoted state.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Ensure a live index exists under `live_name`, creating an empty one if necessary.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the live index is ready for queries
    /// * `Err(SearchIndexError)` - If creation fails
    async fn ensure_index_exists(&self, live_name: &str) -> Result<(), SearchIndexError>;

    /// Ensure a staging index exists, creating it if necessary.
    ///
    /// Must be idempotent and tolerate a concurrent creation of the same index.
    async fn ensure_staging_index(&self, staging_name: &str) -> Result<(), SearchIndexError>;

    /// Upsert documents by `object_id` and return a summary of successful and failed items.
    ///
    /// # Arguments
    ///
    /// * `index_name` - The index to write to
    /// * `documents` - Documents to create or overwrite
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Contains aggregate statistics and individual results
    /// * `Err(SearchIndexError)` - If the bulk operation fails entirely
    async fn bulk_upsert_documents(
        &self,
        index_name: &str,
        documents: &[IndexableDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError>;

    /// List concrete index names matching a wildcard pattern.
    async fn list_indices(&self, pattern: &str) -> Result<Vec<String>, SearchIndexError>;

    /// Atomically make the contents of `staging_name` visible under `live_name`, then
    /// discard the staging index and the previous live contents.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If readers of `live_name` now see the staged documents
    /// * `Err(SearchIndexError)` - If promotion failed; `live_name` still serves the old contents
    async fn promote(&self, staging_name: &str, live_name: &str) -> Result<(), SearchIndexError>;

    /// Run a query against the given live indices and return hits in ranking order.
    async fn search(
        &self,
        index_names: &[String],
        query: &SearchQuery,
    ) -> Result<SearchResponse, SearchIndexError>;
}

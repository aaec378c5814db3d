//! Search index service implementation.
//!
//! This module provides the main service for interacting with the search backend.
//! It maps index handles to backend names, validates input, and bounds every backend
//! call with the configured timeout.

use std::future::Future;
use std::time::Duration;

use search_sync_shared::{
    IndexHandle, IndexStage, IndexTarget, IndexableDocument, SearchQuery, SearchResponse,
};
use tracing::debug;

use crate::config::SearchIndexServiceConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::BatchOperationSummary;

/// The main service for interacting with the search backend.
///
/// This is the high-level API the sync core uses. It provides input validation,
/// handle-to-name mapping, and timeouts, and delegates to a `SearchIndexProvider` for
/// actual backend operations. All operations return `SearchIndexError` for consistent
/// error handling.
///
/// Index names depend on the index prefix, which is part of the settings snapshot
/// passed to each core operation, so every method takes the prefix explicitly.
///
/// # Example
///
/// ```no_run
/// use search_sync_repository::SearchIndexService;
/// use search_sync_repository::opensearch::{IndexConfig, OpenSearchProvider};
/// use search_sync_shared::{IndexTarget, IndexableDocument};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Box::new(OpenSearchProvider::new("http://localhost:9200", IndexConfig::default()).await?);
/// let service = SearchIndexService::new(provider);
///
/// let docs = vec![IndexableDocument::new("1", "post")];
/// service.index_documents("wp_", &IndexTarget::content_type("post"), docs).await?;
/// service.promote("wp_", &IndexTarget::content_type("post")).await?;
/// # Ok(())
/// # }
/// ```
pub struct SearchIndexService {
    provider: Box<dyn SearchIndexProvider>,
    config: SearchIndexServiceConfig,
}

impl SearchIndexService {
    /// Create a new SearchIndexService with default configuration.
    ///
    /// The default configuration includes a batch size limit of 1000 documents and a
    /// 30 second timeout per backend call.
    pub fn new(provider: Box<dyn SearchIndexProvider>) -> Self {
        Self {
            provider,
            config: SearchIndexServiceConfig::default(),
        }
    }

    /// Create a new SearchIndexService with custom configuration.
    pub fn with_config(
        provider: Box<dyn SearchIndexProvider>,
        config: SearchIndexServiceConfig,
    ) -> Self {
        Self { provider, config }
    }

    /// Maximum number of documents accepted by one `index_documents` call.
    pub fn max_batch_size(&self) -> Option<usize> {
        self.config.max_batch_size
    }

    /// Check if batch size exceeds the configured limit.
    fn validate_batch_size(&self, size: usize) -> Result<(), SearchIndexError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(SearchIndexError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    /// Run a backend call under the configured timeout.
    async fn bounded<T, F>(&self, operation: &str, call: F) -> Result<T, SearchIndexError>
    where
        F: Future<Output = Result<T, SearchIndexError>>,
    {
        Self::bounded_by(self.config.request_timeout, operation, call).await
    }

    async fn bounded_by<T, F>(
        limit: Duration,
        operation: &str,
        call: F,
    ) -> Result<T, SearchIndexError>
    where
        F: Future<Output = Result<T, SearchIndexError>>,
    {
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(SearchIndexError::timeout(operation, limit)),
        }
    }

    /// Ensure the live index of every target exists so queries never hit a missing index.
    ///
    /// Every target is attempted; the first failure is returned after all attempts.
    pub async fn handle_index_creation(
        &self,
        prefix: &str,
        targets: &[IndexTarget],
    ) -> Result<(), SearchIndexError> {
        let mut first_error = None;

        for target in targets {
            let live_name = IndexHandle::live(target.clone()).index_name(prefix);
            let result = self
                .bounded(
                    "ensure_index_exists",
                    self.provider.ensure_index_exists(&live_name),
                )
                .await;

            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Upsert documents into the staging index of a target, creating it on first use.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Per-document outcomes; partial failures are reported here
    /// * `Err(SearchIndexError::BatchSizeExceeded)` - If the batch exceeds the configured maximum
    /// * `Err(SearchIndexError)` - If the staging index could not be created or the bulk call failed
    pub async fn index_documents(
        &self,
        prefix: &str,
        target: &IndexTarget,
        documents: Vec<IndexableDocument>,
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::empty());
        }

        self.validate_batch_size(documents.len())?;

        if let Some(doc) = documents.iter().find(|d| d.object_id.is_empty()) {
            return Err(SearchIndexError::validation(format!(
                "object_id is required (item_type={})",
                doc.item_type
            )));
        }

        let staging_name = IndexHandle::staging(target.clone()).index_name(prefix);

        self.bounded(
            "ensure_staging_index",
            self.provider.ensure_staging_index(&staging_name),
        )
        .await?;

        debug!(index = %staging_name, count = documents.len(), "Submitting documents to staging");

        self.bounded(
            "bulk_upsert_documents",
            self.provider.bulk_upsert_documents(&staging_name, &documents),
        )
        .await
    }

    /// List the staging handles that currently exist under the prefix.
    pub async fn staging_handles(&self, prefix: &str) -> Result<Vec<IndexHandle>, SearchIndexError> {
        let pattern = format!("{}*{}", prefix, search_sync_shared::types::index_handle::STAGING_SUFFIX);
        let names = self
            .bounded("list_indices", self.provider.list_indices(&pattern))
            .await?;

        let mut handles: Vec<IndexHandle> = names
            .iter()
            .filter_map(|name| IndexHandle::parse(prefix, name))
            .filter(|handle| handle.stage == IndexStage::Staging)
            .collect();
        handles.sort_by(|a, b| a.target.cmp(&b.target));
        handles.dedup();

        Ok(handles)
    }

    /// Promote the staging index of a target to live.
    pub async fn promote(&self, prefix: &str, target: &IndexTarget) -> Result<(), SearchIndexError> {
        let staging_name = IndexHandle::staging(target.clone()).index_name(prefix);
        let live_name = IndexHandle::live(target.clone()).index_name(prefix);

        Self::bounded_by(
            self.config.promotion_timeout,
            "promote",
            self.provider.promote(&staging_name, &live_name),
        )
        .await
    }

    /// Search the live indices of the query's item types.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchResponse)` - Hits in the backend's ranking order
    /// * `Err(SearchIndexError::ValidationError)` - If the query is invalid
    /// * `Err(SearchIndexError)` - If the search fails or times out
    pub async fn search(
        &self,
        prefix: &str,
        query: &SearchQuery,
    ) -> Result<SearchResponse, SearchIndexError> {
        query.validate().map_err(SearchIndexError::validation)?;

        let index_names: Vec<String> = query
            .item_types
            .iter()
            .map(|t| IndexHandle::live(IndexTarget::content_type(t.as_str())).index_name(prefix))
            .collect();

        self.bounded("search", self.provider.search(&index_names, query))
            .await
    }
}

//! Loader module for the search sync.
//!
//! Submits processed documents to a staging index through the search service.

use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

use crate::errors::SyncError;
use search_sync_repository::{BatchOperationSummary, SearchIndexService};
use search_sync_shared::{IndexTarget, IndexableDocument};

/// Loader that upserts documents into the search backend.
///
/// The loader is responsible for:
/// - Splitting submissions to respect the service's batch size limit
/// - Logging partial failures per document
pub struct SearchLoader {
    search: Arc<SearchIndexService>,
}

impl SearchLoader {
    /// Create a new search loader over the given service.
    pub fn new(search: Arc<SearchIndexService>) -> Self {
        Self { search }
    }

    /// Upsert documents into the staging index of `target`.
    ///
    /// Documents that the backend rejects individually are counted in the summary and
    /// logged; only a failure of a whole request is returned as an error.
    #[instrument(skip(self, documents), fields(index_target = %target, document_count = documents.len()))]
    pub async fn submit(
        &self,
        prefix: &str,
        target: &IndexTarget,
        documents: Vec<IndexableDocument>,
    ) -> Result<BatchOperationSummary, SyncError> {
        let mut summary = BatchOperationSummary::empty();
        if documents.is_empty() {
            return Ok(summary);
        }

        let chunk_size = self
            .search
            .max_batch_size()
            .unwrap_or(documents.len())
            .max(1);

        let mut remaining = documents;
        while !remaining.is_empty() {
            let rest = remaining.split_off(remaining.len().min(chunk_size));
            let chunk = std::mem::replace(&mut remaining, rest);
            let count = chunk.len();

            debug!(count = count, "Flushing documents to search index");

            match self.search.index_documents(prefix, target, chunk).await {
                Ok(chunk_summary) => summary.absorb(chunk_summary),
                Err(e) => {
                    error!(error = %e, count = count, "Failed to bulk upsert documents");
                    return Err(e.into());
                }
            }
        }

        if summary.failed > 0 {
            warn!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                "Bulk upsert completed with some failures"
            );
            for result in summary.results.iter().filter(|r| !r.success) {
                if let Some(ref err) = result.error {
                    error!(
                        object_id = %result.object_id,
                        error = %err,
                        "Failed to upsert document"
                    );
                }
            }
        } else {
            debug!(count = summary.succeeded, "Successfully upserted all documents");
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use search_sync_repository::{
        BatchOperationResult, SearchIndexError, SearchIndexProvider, SearchIndexServiceConfig,
    };
    use search_sync_shared::{SearchQuery, SearchResponse};
    use std::sync::Mutex;

    /// Mock search provider for testing.
    #[derive(Default)]
    struct MockSearchProvider {
        bulk_calls: Arc<Mutex<Vec<(String, usize)>>>,
        reject_id: Option<String>,
    }

    #[async_trait]
    impl SearchIndexProvider for MockSearchProvider {
        async fn ensure_index_exists(&self, _live_name: &str) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn ensure_staging_index(&self, _staging_name: &str) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn bulk_upsert_documents(
            &self,
            index_name: &str,
            documents: &[IndexableDocument],
        ) -> Result<BatchOperationSummary, SearchIndexError> {
            self.bulk_calls
                .lock()
                .unwrap()
                .push((index_name.to_string(), documents.len()));
            Ok(BatchOperationSummary::from_results(
                documents
                    .iter()
                    .map(|d| {
                        if Some(&d.object_id) == self.reject_id.as_ref() {
                            BatchOperationResult::failed(
                                d.object_id.clone(),
                                SearchIndexError::index("mapper_parsing_exception"),
                            )
                        } else {
                            BatchOperationResult::succeeded(d.object_id.clone())
                        }
                    })
                    .collect(),
            ))
        }

        async fn list_indices(&self, _pattern: &str) -> Result<Vec<String>, SearchIndexError> {
            Ok(Vec::new())
        }

        async fn promote(&self, _staging: &str, _live: &str) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn search(
            &self,
            _index_names: &[String],
            _query: &SearchQuery,
        ) -> Result<SearchResponse, SearchIndexError> {
            Ok(SearchResponse::empty())
        }
    }

    fn docs(count: usize) -> Vec<IndexableDocument> {
        (1..=count)
            .map(|i| IndexableDocument::new(i.to_string(), "post"))
            .collect()
    }

    #[tokio::test]
    async fn test_submit_chunks_by_max_batch_size() {
        let provider = MockSearchProvider::default();
        let calls = provider.bulk_calls.clone();
        let service = SearchIndexService::with_config(
            Box::new(provider),
            SearchIndexServiceConfig::with_max_batch_size(2),
        );
        let loader = SearchLoader::new(Arc::new(service));

        let summary = loader
            .submit("wp_", &IndexTarget::Taxonomies, docs(5))
            .await
            .unwrap();

        assert_eq!(summary.total, 5);
        assert_eq!(summary.succeeded, 5);
        assert_eq!(
            calls
                .lock()
                .unwrap()
                .iter()
                .map(|(_, n)| *n)
                .collect::<Vec<_>>(),
            vec![2, 2, 1]
        );
        assert!(calls
            .lock()
            .unwrap()
            .iter()
            .all(|(index, _)| index == "wp_terms_temp"));
    }

    #[tokio::test]
    async fn test_submit_reports_partial_failures() {
        let provider = MockSearchProvider {
            reject_id: Some("2".to_string()),
            ..MockSearchProvider::default()
        };
        let loader = SearchLoader::new(Arc::new(SearchIndexService::new(Box::new(provider))));

        let summary = loader
            .submit("wp_", &IndexTarget::content_type("post"), docs(3))
            .await
            .unwrap();

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_submit_empty_is_noop() {
        let provider = MockSearchProvider::default();
        let calls = provider.bulk_calls.clone();
        let loader = SearchLoader::new(Arc::new(SearchIndexService::new(Box::new(provider))));

        let summary = loader
            .submit("wp_", &IndexTarget::content_type("post"), Vec::new())
            .await
            .unwrap();

        assert_eq!(summary.total, 0);
        assert!(calls.lock().unwrap().is_empty());
    }
}

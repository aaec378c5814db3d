//! Taxonomy term indexer.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use crate::errors::SyncError;
use crate::loader::SearchLoader;
use crate::processor::DocumentProcessor;
use search_sync_repository::ContentRepository;
use search_sync_shared::{IndexTarget, SyncSettings};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomyReport {
    pub taxonomies: usize,
    pub submitted: usize,
    pub failed: usize,
}

/// Writes one document per taxonomy term into the taxonomy staging index.
pub struct TaxonomyIndexer {
    content: Arc<dyn ContentRepository>,
    processor: DocumentProcessor,
    loader: Arc<SearchLoader>,
}

impl TaxonomyIndexer {
    pub fn new(
        content: Arc<dyn ContentRepository>,
        processor: DocumentProcessor,
        loader: Arc<SearchLoader>,
    ) -> Self {
        Self {
            content,
            processor,
            loader,
        }
    }

    /// Index the terms of every taxonomy in one call.
    ///
    /// Terms with no items are indexed too. The first failing taxonomy aborts the
    /// call; terms already submitted stay in staging and are overwritten on retry.
    #[instrument(skip(self, settings), fields(prefix = %settings.index_prefix))]
    pub async fn index_taxonomies(&self, settings: &SyncSettings) -> Result<TaxonomyReport, SyncError> {
        let taxonomies = self.content.list_taxonomies().await?;

        let mut report = TaxonomyReport {
            taxonomies: taxonomies.len(),
            submitted: 0,
            failed: 0,
        };

        for taxonomy in &taxonomies {
            let terms = self.content.list_terms(taxonomy).await?;
            let documents = self.processor.process_terms(terms);

            let summary = self
                .loader
                .submit(&settings.index_prefix, &IndexTarget::Taxonomies, documents)
                .await?;

            report.submitted += summary.total;
            report.failed += summary.failed;
        }

        info!(
            taxonomies = report.taxonomies,
            submitted = report.submitted,
            failed = report.failed,
            "Indexed taxonomy terms"
        );
        Ok(report)
    }
}

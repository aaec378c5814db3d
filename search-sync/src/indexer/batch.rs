//! Batch indexer for one content type.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::errors::SyncError;
use crate::loader::SearchLoader;
use crate::processor::DocumentProcessor;
use search_sync_repository::ContentRepository;
use search_sync_shared::{IndexTarget, SyncSettings};

/// Outcome of one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub item_type: String,
    pub cursor: u64,
    /// Documents sent to the staging index.
    pub submitted: usize,
    /// Documents the backend rejected individually.
    pub failed: usize,
}

/// Builds the staging index of a content type, one batch per call.
pub struct BatchIndexer {
    content: Arc<dyn ContentRepository>,
    processor: DocumentProcessor,
    loader: Arc<SearchLoader>,
}

impl BatchIndexer {
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

    /// Index items `[cursor * batch_size, (cursor + 1) * batch_size)` of `item_type`,
    /// ordered by id, into the type's staging index.
    ///
    /// Re-running the same cursor overwrites the same documents. An empty range is a
    /// successful no-op and does not create the staging index.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchReport)` - Documents submitted and rejected
    /// * `Err(SyncError::ValidationError)` - If the cursor offset overflows
    /// * `Err(SyncError)` - If reading content or the bulk request failed
    #[instrument(skip(self, settings), fields(batch_size = settings.batch_size))]
    pub async fn index_batch(
        &self,
        settings: &SyncSettings,
        item_type: &str,
        cursor: u64,
    ) -> Result<BatchReport, SyncError> {
        let batch_size = settings.batch_size;
        if batch_size == 0 {
            return Err(SyncError::validation("batch_size must be greater than zero"));
        }
        if !IndexTarget::is_valid_type_name(item_type) {
            return Err(SyncError::validation(format!(
                "type name '{}' collides with another index name",
                item_type
            )));
        }

        let offset = usize::try_from(cursor)
            .ok()
            .and_then(|c| c.checked_mul(batch_size))
            .ok_or_else(|| {
                SyncError::validation(format!(
                    "cursor {} with batch size {} is out of range",
                    cursor, batch_size
                ))
            })?;

        let items = self.content.list_items(item_type, offset, batch_size).await?;

        let mut report = BatchReport {
            item_type: item_type.to_string(),
            cursor,
            submitted: 0,
            failed: 0,
        };

        if items.is_empty() {
            debug!(offset = offset, "No items in batch range");
            return Ok(report);
        }

        let documents = self
            .processor
            .process_items(items, &settings.mapping_for(item_type));

        let summary = self
            .loader
            .submit(
                &settings.index_prefix,
                &IndexTarget::content_type(item_type),
                documents,
            )
            .await?;

        report.submitted = summary.total;
        report.failed = summary.failed;

        info!(
            submitted = report.submitted,
            failed = report.failed,
            "Indexed batch"
        );
        Ok(report)
    }
}

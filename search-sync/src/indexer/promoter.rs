//! Index promoter: swaps every staging index into the live position.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, instrument};

use crate::errors::SyncError;
use search_sync_repository::SearchIndexService;
use search_sync_shared::{IndexTarget, SyncSettings};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromotionFailure {
    pub target: IndexTarget,
    pub error: String,
}

/// Targets promoted and targets whose promotion failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PromotionReport {
    pub promoted: Vec<IndexTarget>,
    pub failed: Vec<PromotionFailure>,
}

impl PromotionReport {
    /// Returns true if every staging index that existed was promoted.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Promotes staging indices to live.
pub struct IndexPromoter {
    search: Arc<SearchIndexService>,
}

impl IndexPromoter {
    pub fn new(search: Arc<SearchIndexService>) -> Self {
        Self { search }
    }

    /// Promote every staging index under the configured prefix.
    ///
    /// Targets are promoted independently; a failure is recorded and the remaining
    /// targets are still attempted. Only a failure to list the staging indices is
    /// returned as an error.
    #[instrument(skip(self, settings), fields(prefix = %settings.index_prefix))]
    pub async fn move_temp_indexes(
        &self,
        settings: &SyncSettings,
    ) -> Result<PromotionReport, SyncError> {
        let handles = self.search.staging_handles(&settings.index_prefix).await?;

        let mut report = PromotionReport::default();

        for handle in handles {
            match self
                .search
                .promote(&settings.index_prefix, &handle.target)
                .await
            {
                Ok(()) => report.promoted.push(handle.target),
                Err(e) => {
                    error!(index_target = %handle.target, error = %e, "Failed to promote staging index");
                    report.failed.push(PromotionFailure {
                        target: handle.target,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            promoted = report.promoted.len(),
            failed = report.failed.len(),
            "Promotion finished"
        );
        Ok(report)
    }
}

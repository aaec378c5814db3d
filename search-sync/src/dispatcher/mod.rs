//! Batch dispatcher for the search sync.
//!
//! Routes the control messages of one request to the indexing units. The
//! dispatcher is stateless: the driving client decides which batches to send
//! and when to promote.
//!
//! ## Control tokens
//!
//! | token | effect |
//! |---|---|
//! | `reindex` | none |
//! | `handle_index_creation` | ensure every configured live index exists |
//! | `index_taxonomies` | index all taxonomy terms into staging |
//! | `move_indexes` | promote staging indices; clear `needs_reindex` on full success |
//! | `type__T__N` | refresh `last_update`, then index batch `N` of type `T` |

mod messages;
mod plan;

pub use messages::{ControlMessage, IgnoreReason, TOKEN_SEPARATOR};
pub use plan::ReindexPlan;

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument, warn, Span};
use uuid::Uuid;

use crate::errors::SyncError;
use crate::indexer::{
    BatchIndexer, BatchReport, IndexPromoter, PromotionReport, TaxonomyIndexer, TaxonomyReport,
};
use search_sync_repository::{ConfigContext, SearchIndexService};
use search_sync_shared::{IndexTarget, SyncSettings};

/// What a completed or failed message produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum WorkSummary {
    None,
    Batch(BatchReport),
    Taxonomies(TaxonomyReport),
    Promotion(PromotionReport),
}

impl WorkSummary {
    fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Outcome of one control message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MessageOutcome {
    Completed {
        #[serde(skip_serializing_if = "WorkSummary::is_none")]
        summary: WorkSummary,
    },
    Ignored {
        reason: IgnoreReason,
    },
    Failed {
        error: String,
        #[serde(skip_serializing_if = "WorkSummary::is_none")]
        summary: WorkSummary,
    },
}

impl MessageOutcome {
    fn completed(summary: WorkSummary) -> Self {
        Self::Completed { summary }
    }

    fn failed(error: &SyncError) -> Self {
        Self::Failed {
            error: error.to_string(),
            summary: WorkSummary::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchEntry {
    pub token: String,
    pub message: ControlMessage,
    pub outcome: MessageOutcome,
}

/// One entry per received token, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub request_id: String,
    pub entries: Vec<DispatchEntry>,
}

impl DispatchReport {
    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, MessageOutcome::Completed { .. }))
    }

    pub fn ignored(&self) -> usize {
        self.count(|o| matches!(o, MessageOutcome::Ignored { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, MessageOutcome::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&MessageOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| predicate(&e.outcome)).count()
    }
}

/// Stateless, request-driven router of control messages.
pub struct BatchDispatcher {
    context: Arc<dyn ConfigContext>,
    search: Arc<SearchIndexService>,
    batch_indexer: BatchIndexer,
    taxonomy_indexer: TaxonomyIndexer,
    promoter: IndexPromoter,
}

impl BatchDispatcher {
    pub fn new(
        context: Arc<dyn ConfigContext>,
        search: Arc<SearchIndexService>,
        batch_indexer: BatchIndexer,
        taxonomy_indexer: TaxonomyIndexer,
        promoter: IndexPromoter,
    ) -> Self {
        Self {
            context,
            search,
            batch_indexer,
            taxonomy_indexer,
            promoter,
        }
    }

    /// Process every token of one request, in order.
    ///
    /// A failing or malformed token never stops the tokens after it. Settings are
    /// read once per request.
    #[instrument(skip(self, tokens), fields(request_id = tracing::field::Empty, message_count = tokens.len()))]
    pub async fn dispatch(&self, tokens: &[String]) -> DispatchReport {
        let request_id = Uuid::new_v4().to_string();
        Span::current().record("request_id", request_id.as_str());

        let settings = self.context.settings().await;
        let mut entries = Vec::with_capacity(tokens.len());

        for token in tokens {
            let message = ControlMessage::parse(token);
            let outcome = self.handle(&settings, &message).await;

            if let MessageOutcome::Failed { error, .. } = &outcome {
                warn!(token = %token, error = %error, "Control message failed");
            }

            entries.push(DispatchEntry {
                token: token.clone(),
                message,
                outcome,
            });
        }

        let report = DispatchReport {
            request_id,
            entries,
        };

        info!(
            completed = report.completed(),
            ignored = report.ignored(),
            failed = report.failed(),
            "Dispatch finished"
        );
        report
    }

    async fn handle(&self, settings: &SyncSettings, message: &ControlMessage) -> MessageOutcome {
        match message {
            ControlMessage::Placeholder => MessageOutcome::completed(WorkSummary::None),
            ControlMessage::HandleIndexCreation => {
                match self.handle_index_creation(settings).await {
                    Ok(()) => MessageOutcome::completed(WorkSummary::None),
                    Err(e) => MessageOutcome::failed(&e),
                }
            }
            ControlMessage::IndexTaxonomies => {
                match self.taxonomy_indexer.index_taxonomies(settings).await {
                    Ok(report) => MessageOutcome::completed(WorkSummary::Taxonomies(report)),
                    Err(e) => MessageOutcome::failed(&e),
                }
            }
            ControlMessage::MoveIndexes => self.move_indexes(settings).await,
            ControlMessage::IndexBatch { item_type, cursor } => {
                self.context.touch_last_update(Utc::now()).await;
                match self
                    .batch_indexer
                    .index_batch(settings, item_type, *cursor)
                    .await
                {
                    Ok(report) => MessageOutcome::completed(WorkSummary::Batch(report)),
                    Err(e) => MessageOutcome::failed(&e),
                }
            }
            ControlMessage::Ignored { reason } => {
                debug!(reason = ?reason, "Ignoring control message");
                MessageOutcome::Ignored { reason: *reason }
            }
        }
    }

    /// Ensure the live index of every configured type and of the taxonomies exists.
    async fn handle_index_creation(&self, settings: &SyncSettings) -> Result<(), SyncError> {
        let targets: Vec<IndexTarget> = settings
            .type_names()
            .into_iter()
            .map(IndexTarget::ContentType)
            .chain([IndexTarget::Taxonomies])
            .collect();

        self.search
            .handle_index_creation(&settings.index_prefix, &targets)
            .await?;

        info!(targets = targets.len(), "Live indices ready");
        Ok(())
    }

    async fn move_indexes(&self, settings: &SyncSettings) -> MessageOutcome {
        let report = match self.promoter.move_temp_indexes(settings).await {
            Ok(report) => report,
            Err(e) => return MessageOutcome::failed(&e),
        };

        if report.is_complete() {
            self.context.set_needs_reindex(false).await;
            MessageOutcome::completed(WorkSummary::Promotion(report))
        } else {
            MessageOutcome::Failed {
                error: format!(
                    "{} of {} staging indices failed to promote",
                    report.failed.len(),
                    report.failed.len() + report.promoted.len()
                ),
                summary: WorkSummary::Promotion(report),
            }
        }
    }
}

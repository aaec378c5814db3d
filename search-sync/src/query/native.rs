//! Minimal native query executor over the content repository.
//!
//! Stands in for the host's own query engine when the sync runs as a service:
//! it pages through items of the requested types and applies a plain substring
//! match for search terms.

use std::sync::Arc;

use crate::errors::SyncError;
use search_sync_repository::ContentRepository;
use search_sync_shared::{ContentItem, NativeQuery, SyncSettings};

pub struct ListingExecutor {
    content: Arc<dyn ContentRepository>,
}

impl ListingExecutor {
    pub fn new(content: Arc<dyn ContentRepository>) -> Self {
        Self { content }
    }

    /// Run a native query.
    ///
    /// Returns the empty placeholder list when `suppress_native` is set. Types are
    /// read in order and the result is cut to one page.
    ///
    /// Every type is paged at the same offset, independent of the backend's ranked
    /// page. Under `Intersect` a ranked item outside this window is dropped and
    /// counted, and later pages over several types can skip or repeat items.
    pub async fn execute(
        &self,
        settings: &SyncSettings,
        query: &NativeQuery,
    ) -> Result<Vec<ContentItem>, SyncError> {
        if query.suppress_native || query.per_page == 0 {
            return Ok(Vec::new());
        }

        let item_types = if query.item_types.is_empty() {
            settings.type_names()
        } else {
            query.item_types.clone()
        };
        let term = query
            .search_term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        let mut items = Vec::new();
        for item_type in &item_types {
            let page = self
                .content
                .list_items(item_type, query.offset(), query.per_page)
                .await?;
            items.extend(page.into_iter().filter(|item| match &term {
                Some(term) => matches_term(item, term),
                None => true,
            }));
            if items.len() >= query.per_page {
                break;
            }
        }

        items.truncate(query.per_page);
        Ok(items)
    }
}

fn matches_term(item: &ContentItem, term: &str) -> bool {
    item.title.to_lowercase().contains(term)
        || item.body.to_lowercase().contains(term)
        || item
            .excerpt
            .as_deref()
            .is_some_and(|e| e.to_lowercase().contains(term))
}

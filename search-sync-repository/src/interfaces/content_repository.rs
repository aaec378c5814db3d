//! Content repository trait definition.

use async_trait::async_trait;
use search_sync_shared::{ContentItem, TaxonomyTerm};

use crate::errors::ContentRepositoryError;

/// Read access to the host repository's content.
///
/// The sync core never writes through this trait. Item listings are ordered by
/// id ascending so that a `(type, offset, limit)` window is stable across calls.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// List published items of one type, ordered by id ascending.
    async fn list_items(
        &self,
        item_type: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ContentItem>, ContentRepositoryError>;

    /// Fetch one item by id. Returns `Ok(None)` if it does not exist.
    async fn get_item(&self, id: u64) -> Result<Option<ContentItem>, ContentRepositoryError>;

    /// Fetch several items by id, in no particular order. Missing ids are skipped.
    async fn get_items(&self, ids: &[u64]) -> Result<Vec<ContentItem>, ContentRepositoryError> {
        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(item) = self.get_item(*id).await? {
                items.push(item);
            }
        }
        Ok(items)
    }

    /// Count published items of one type.
    async fn count_items(&self, item_type: &str) -> Result<u64, ContentRepositoryError>;

    /// List every taxonomy tag defined in the repository.
    async fn list_taxonomies(&self) -> Result<Vec<String>, ContentRepositoryError>;

    /// List every term of one taxonomy, including terms with no items.
    async fn list_terms(&self, taxonomy: &str) -> Result<Vec<TaxonomyTerm>, ContentRepositoryError>;

    /// Count the terms of one taxonomy.
    async fn count_terms(&self, taxonomy: &str) -> Result<u64, ContentRepositoryError> {
        Ok(self.list_terms(taxonomy).await?.len() as u64)
    }
}

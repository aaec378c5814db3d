//! The host repository's native query and the re-ranked result set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::content_item::ContentItem;

/// Default page size of a native query.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Marker left on a native query once its search has been handed to the
/// external index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatedSearch {
    pub term: String,
    pub facet_filters: BTreeMap<String, String>,
}

/// A content query as the host repository understands it.
///
/// A query whose `search_term` is non-empty is a full-text search request.
/// After interception it stays a valid query: at worst the native executor
/// lists items of the requested types, or returns nothing when
/// `suppress_native` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeQuery {
    #[serde(default)]
    pub search_term: Option<String>,
    /// Content types to query. Empty means every configured type.
    #[serde(default)]
    pub item_types: Vec<String>,
    #[serde(default)]
    pub facet_filters: BTreeMap<String, String>,
    /// One-based page number.
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
    /// The native executor must return an empty placeholder list.
    #[serde(default)]
    pub suppress_native: bool,
    #[serde(default)]
    pub delegated: Option<DelegatedSearch>,
}

fn default_page() -> usize {
    1
}

fn default_per_page() -> usize {
    DEFAULT_PER_PAGE
}

impl Default for NativeQuery {
    fn default() -> Self {
        Self {
            search_term: None,
            item_types: Vec::new(),
            facet_filters: BTreeMap::new(),
            page: default_page(),
            per_page: default_per_page(),
            suppress_native: false,
            delegated: None,
        }
    }
}

impl NativeQuery {
    /// Create a full-text search query.
    ///
    /// # Example
    ///
    /// ```
    /// use search_sync_shared::NativeQuery;
    ///
    /// let query = NativeQuery::search("shoes").for_type("product");
    /// assert!(query.is_search_request());
    /// ```
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search_term: Some(term.into()),
            ..Self::default()
        }
    }

    pub fn for_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_types.push(item_type.into());
        self
    }

    pub fn with_facet(mut self, facet: impl Into<String>, value: impl Into<String>) -> Self {
        self.facet_filters.insert(facet.into(), value.into());
        self
    }

    pub fn with_page(mut self, page: usize, per_page: usize) -> Self {
        self.page = page.max(1);
        self.per_page = per_page;
        self
    }

    /// Returns true if the query carries a non-empty search term.
    pub fn is_search_request(&self) -> bool {
        self.search_term
            .as_deref()
            .map(|term| !term.trim().is_empty())
            .unwrap_or(false)
    }

    /// Returns true if ranking for this query comes from the external index.
    pub fn is_delegated(&self) -> bool {
        self.delegated.is_some()
    }

    /// Offset of the first item of the requested page.
    pub fn offset(&self) -> usize {
        (self.page.max(1) - 1).saturating_mul(self.per_page)
    }
}

/// Native items rebuilt in the external index's ranking order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankedResultSet {
    /// Ids in the order the external index returned them.
    pub ranked_ids: Vec<u64>,
    /// Native items in ranking order, stale ids removed.
    pub items: Vec<ContentItem>,
    /// Ranked ids that had no native item.
    pub dropped: usize,
}

impl RankedResultSet {
    /// Wrap a native list that was not re-ranked.
    pub fn passthrough(items: Vec<ContentItem>) -> Self {
        Self {
            ranked_ids: Vec::new(),
            items,
            dropped: 0,
        }
    }

    pub fn into_items(self) -> Vec<ContentItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_search_request() {
        assert!(NativeQuery::search("shoes").is_search_request());
        assert!(!NativeQuery::search("   ").is_search_request());
        assert!(!NativeQuery::default().is_search_request());
    }

    #[test]
    fn test_offset() {
        assert_eq!(NativeQuery::default().offset(), 0);
        assert_eq!(NativeQuery::default().with_page(3, 20).offset(), 40);
        assert_eq!(NativeQuery::default().with_page(0, 20).offset(), 0);
    }

    #[test]
    fn test_deserialize_defaults() {
        let query: NativeQuery = serde_json::from_str(r#"{"search_term":"x"}"#).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, DEFAULT_PER_PAGE);
        assert!(!query.suppress_native);
        assert!(query.delegated.is_none());
    }
}

//! Search query types for the search backend.
//!
//! This module defines the query structure sent to the live indices when a
//! native search is delegated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::settings::CustomRanking;

/// Maximum number of ranked ids requested in one query.
pub const MAX_LIMIT: usize = 100;

/// Search query parameters.
///
/// This struct represents a search request with all necessary parameters
/// to execute a search against the live indices of one or more content types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchQuery {
    /// The search query string.
    pub query: String,

    /// The content types whose live indices are searched.
    pub item_types: Vec<String>,

    /// Exact-match facet filters (facet name -> value).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub facet_filters: BTreeMap<String, String>,

    /// Tie-breakers applied after text relevance, in priority order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_ranking: Vec<CustomRanking>,

    /// Maximum number of results to return.
    /// Default is 20, maximum is 100.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Offset for pagination.
    /// Default is 0.
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    20
}

impl SearchQuery {
    /// Create a new query over the given content types.
    ///
    /// # Example
    ///
    /// ```
    /// use search_sync_shared::SearchQuery;
    ///
    /// let query = SearchQuery::new("shoes", vec!["product".to_string()]).with_limit(10);
    /// assert_eq!(query.limit, 10);
    /// ```
    pub fn new(query: impl Into<String>, item_types: Vec<String>) -> Self {
        Self {
            query: query.into(),
            item_types,
            facet_filters: BTreeMap::new(),
            custom_ranking: Vec::new(),
            limit: default_limit(),
            offset: 0,
        }
    }

    /// Set the facet filters.
    pub fn with_facet_filters(mut self, facet_filters: BTreeMap<String, String>) -> Self {
        self.facet_filters = facet_filters;
        self
    }

    /// Set the custom ranking tie-breakers.
    pub fn with_custom_ranking(mut self, custom_ranking: Vec<CustomRanking>) -> Self {
        self.custom_ranking = custom_ranking;
        self
    }

    /// Set the limit for results.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.min(MAX_LIMIT);
        self
    }

    /// Set the offset for pagination.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Validate the query parameters.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.query.trim().is_empty() {
            return Err("Query string cannot be empty".to_string());
        }

        if self.item_types.is_empty() {
            return Err("At least one item type must be searched".to_string());
        }

        if self.limit == 0 {
            return Err("Limit must be greater than zero".to_string());
        }

        Ok(())
    }
}

//! Search result types for the search backend.
//!
//! This module defines the response structures returned from search operations.

use serde::{Deserialize, Serialize};

/// A single ranked hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    /// The document id (the content item id for content documents).
    pub object_id: String,

    /// The content type the hit belongs to.
    pub item_type: String,

    /// Relevance score from the search engine.
    /// Higher scores indicate better matches.
    pub relevance_score: f64,
}

/// Complete search response with hits and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    /// The hits, in the backend's ranking order.
    pub hits: Vec<SearchHit>,

    /// Total number of matching documents.
    /// May be greater than the number of returned hits due to pagination.
    pub total: u64,

    /// Time taken to execute the search in milliseconds.
    pub took_ms: u64,
}

impl SearchResponse {
    /// Create an empty search response.
    pub fn empty() -> Self {
        Self {
            hits: Vec::new(),
            total: 0,
            took_ms: 0,
        }
    }

    /// Create a new search response.
    pub fn new(hits: Vec<SearchHit>, total: u64, took_ms: u64) -> Self {
        Self {
            hits,
            total,
            took_ms,
        }
    }

    /// Document ids in ranking order.
    pub fn ranked_object_ids(&self) -> impl Iterator<Item = &str> {
        self.hits.iter().map(|hit| hit.object_id.as_str())
    }

    /// Returns true if there are no hits.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Returns the number of hits in this response.
    pub fn len(&self) -> usize {
        self.hits.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(object_id: &str, score: f64) -> SearchHit {
        SearchHit {
            object_id: object_id.to_string(),
            item_type: "post".to_string(),
            relevance_score: score,
        }
    }

    #[test]
    fn test_search_response_empty() {
        let response = SearchResponse::empty();
        assert!(response.is_empty());
        assert_eq!(response.len(), 0);
        assert_eq!(response.total, 0);
    }

    #[test]
    fn test_ranked_object_ids_preserve_order() {
        let response = SearchResponse::new(vec![hit("7", 3.0), hit("3", 2.0), hit("9", 2.0)], 3, 4);
        let ids: Vec<&str> = response.ranked_object_ids().collect();
        assert_eq!(ids, vec!["7", "3", "9"]);
        assert_eq!(response.len(), 3);
    }
}

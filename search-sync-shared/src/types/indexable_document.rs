//! Document types for the search index.
//!
//! This module defines the document structure that is submitted to the search engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Document representation for the search index.
///
/// This struct is the projection of a content item or taxonomy term into the
/// shape the backend accepts. It is created per batch, never mutated after
/// submission, and carries no timestamps so that re-indexing unchanged content
/// produces an identical document.
///
/// # Fields
///
/// - `object_id`: Stable document id; the backend upserts by it
/// - `item_type`: Content type tag, or the taxonomy tag for term documents
/// - `searchable`: Full-text fields
/// - `facets`: Exact-match fields usable as filters
/// - `ranking`: Numeric fields used as tie-breakers after text relevance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexableDocument {
    pub object_id: String,
    pub item_type: String,
    #[serde(default)]
    pub searchable: Map<String, Value>,
    #[serde(default)]
    pub facets: Map<String, Value>,
    #[serde(default)]
    pub ranking: BTreeMap<String, f64>,
}

impl IndexableDocument {
    /// Create an empty document.
    ///
    /// # Example
    ///
    /// ```
    /// use search_sync_shared::IndexableDocument;
    ///
    /// let doc = IndexableDocument::new("42", "post");
    /// assert!(doc.searchable.is_empty());
    /// ```
    pub fn new(object_id: impl Into<String>, item_type: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            item_type: item_type.into(),
            searchable: Map::new(),
            facets: Map::new(),
            ranking: BTreeMap::new(),
        }
    }

    /// Generate the id used for a taxonomy term document.
    ///
    /// Term ids are only unique within a taxonomy, so the taxonomy tag is part
    /// of the document id.
    pub fn term_object_id(taxonomy: &str, term_id: u64) -> String {
        format!("{}_{}", taxonomy, term_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_object_id() {
        assert_eq!(IndexableDocument::term_object_id("category", 7), "category_7");
    }

    #[test]
    fn test_serialization() {
        let mut doc = IndexableDocument::new("1", "post");
        doc.searchable.insert("title".to_string(), Value::from("Shoes"));
        doc.ranking.insert("views".to_string(), 12.0);

        let json = serde_json::to_string(&doc).unwrap();
        let deserialized: IndexableDocument = serde_json::from_str(&json).unwrap();

        assert_eq!(doc, deserialized);
    }
}

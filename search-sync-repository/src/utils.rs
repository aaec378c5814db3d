//! Utility functions for the search sync repository.

use crate::errors::SearchIndexError;

/// Parse a content document id back into the content item id.
///
/// Content documents use the decimal item id as their document id; taxonomy term
/// documents do not and are rejected.
///
/// # Arguments
///
/// * `object_id` - The document id as returned by the backend
///
/// # Returns
///
/// * `Ok(u64)` - The content item id
/// * `Err(SearchIndexError)` - If the id is not a decimal integer
///
/// # Example
///
/// ```
/// use search_sync_repository::parse_object_id;
///
/// assert_eq!(parse_object_id("42").expect("numeric id"), 42);
/// assert!(parse_object_id("category_7").is_err());
/// ```
pub fn parse_object_id(object_id: &str) -> Result<u64, SearchIndexError> {
    object_id
        .parse::<u64>()
        .map_err(|e| SearchIndexError::validation(format!("Invalid object_id '{}': {}", object_id, e)))
}

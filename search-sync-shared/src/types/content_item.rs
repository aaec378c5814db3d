//! Content types owned by the host repository.
//!
//! The sync core only reads these; they are the source material projected into
//! search documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A unit of the host repository's content (an article, a page, a product...).
///
/// # Fields
///
/// - `id`: Stable identifier, also used as the search document id
/// - `item_type`: Type tag partitioning the reindex job (e.g. "post", "page")
/// - `title`, `body`, `excerpt`, `author`, `published_at`: Built-in fields
/// - `attributes`: Free-form fields that field mappings may reference by name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentItem {
    pub id: u64,
    pub item_type: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl ContentItem {
    /// Create an item with only the required fields set.
    ///
    /// # Example
    ///
    /// ```
    /// use search_sync_shared::ContentItem;
    ///
    /// let item = ContentItem::new(42, "post", "Hello world").with_body("First post");
    /// assert_eq!(item.field("title").unwrap(), "Hello world");
    /// ```
    pub fn new(id: u64, item_type: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            item_type: item_type.into(),
            title: title.into(),
            body: String::new(),
            excerpt: None,
            author: None,
            published_at: None,
            attributes: Map::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Resolve a field by name.
    ///
    /// Built-in fields shadow attributes of the same name. Returns `None` for
    /// unset optional fields and unknown names.
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id)),
            "item_type" => Some(Value::from(self.item_type.clone())),
            "title" => Some(Value::from(self.title.clone())),
            "body" | "content" => Some(Value::from(self.body.clone())),
            "excerpt" => self.excerpt.clone().map(Value::from),
            "author" => self.author.clone().map(Value::from),
            "published_at" => self.published_at.map(|at| Value::from(at.to_rfc3339())),
            other => self.attributes.get(other).cloned(),
        }
    }
}

/// A classification term (category, tag, ...) belonging to one taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaxonomyTerm {
    pub term_id: u64,
    pub taxonomy: String,
    pub name: String,
    pub slug: String,
    /// Number of content items attached to this term.
    pub item_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_resolves_builtins_before_attributes() {
        let item = ContentItem::new(1, "post", "Real title")
            .with_attribute("title", "shadowed")
            .with_attribute("color", "red");

        assert_eq!(item.field("title"), Some(Value::from("Real title")));
        assert_eq!(item.field("color"), Some(Value::from("red")));
        assert_eq!(item.field("id"), Some(Value::from(1u64)));
    }

    #[test]
    fn test_field_missing_optional() {
        let item = ContentItem::new(1, "post", "t");
        assert!(item.field("excerpt").is_none());
        assert!(item.field("author").is_none());
        assert!(item.field("nope").is_none());
    }

    #[test]
    fn test_content_alias_for_body() {
        let item = ContentItem::new(1, "post", "t").with_body("text");
        assert_eq!(item.field("content"), item.field("body"));
    }
}

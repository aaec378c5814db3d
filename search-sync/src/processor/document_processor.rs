//! Document processor implementation.
//!
//! Projects content items and taxonomy terms into IndexableDocument structures.

use serde_json::Value;
use tracing::{debug, instrument, warn};

use search_sync_shared::{ContentItem, FieldMapping, IndexableDocument, TaxonomyTerm};

/// Processor that turns repository content into search documents.
///
/// The processor is responsible for:
/// - Selecting the fields a mapping names and sorting them into searchable,
///   facet and ranking groups
/// - Coercing ranking fields to numbers
/// - Building term documents for the taxonomy index
#[derive(Debug, Clone, Default)]
pub struct DocumentProcessor {}

impl DocumentProcessor {
    /// Create a new document processor.
    pub fn new() -> Self {
        Self {}
    }

    /// Project a batch of items with one field mapping.
    #[instrument(skip(self, items, mapping), fields(item_count = items.len()))]
    pub fn process_items(
        &self,
        items: Vec<ContentItem>,
        mapping: &FieldMapping,
    ) -> Vec<IndexableDocument> {
        let documents: Vec<IndexableDocument> = items
            .iter()
            .map(|item| self.process_item(item, mapping))
            .collect();

        debug!(document_count = documents.len(), "Processed item batch");
        documents
    }

    /// Project a single content item.
    ///
    /// Missing or null fields are left out of the document. A ranking field that is
    /// not numeric is left out and logged.
    pub fn process_item(&self, item: &ContentItem, mapping: &FieldMapping) -> IndexableDocument {
        let mut doc = IndexableDocument::new(item.id.to_string(), item.item_type.clone());

        for name in &mapping.searchable {
            if let Some(value) = item.field(name).filter(|v| !v.is_null()) {
                doc.searchable.insert(name.clone(), value);
            }
        }

        for name in &mapping.facets {
            if let Some(value) = item.field(name).filter(|v| !v.is_null()) {
                doc.facets.insert(name.clone(), value);
            }
        }

        for ranking in &mapping.custom_ranking {
            let Some(value) = item.field(&ranking.attribute) else {
                continue;
            };
            match as_number(&value) {
                Some(number) => {
                    doc.ranking.insert(ranking.attribute.clone(), number);
                }
                None => warn!(
                    item_id = item.id,
                    attribute = %ranking.attribute,
                    "Ranking attribute is not numeric, skipping"
                ),
            }
        }

        doc
    }

    /// Project taxonomy terms.
    #[instrument(skip(self, terms), fields(term_count = terms.len()))]
    pub fn process_terms(&self, terms: Vec<TaxonomyTerm>) -> Vec<IndexableDocument> {
        terms
            .into_iter()
            .map(|term| {
                let mut doc = IndexableDocument::new(
                    IndexableDocument::term_object_id(&term.taxonomy, term.term_id),
                    term.taxonomy.clone(),
                );
                doc.searchable
                    .insert("name".to_string(), Value::from(term.name));
                doc.searchable
                    .insert("slug".to_string(), Value::from(term.slug));
                doc.facets
                    .insert("taxonomy".to_string(), Value::from(term.taxonomy));
                doc.ranking
                    .insert("item_count".to_string(), term.item_count as f64);
                doc
            })
            .collect()
    }
}

/// Numbers pass through; numeric strings (as stored by most hosts) are parsed.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

//! This module defines the core data structures and types used across the search sync crates.

pub mod content_item;
pub mod index_handle;
pub mod indexable_document;
pub mod native_query;
pub mod search_query;
pub mod search_result;
pub mod settings;

pub use content_item::{ContentItem, TaxonomyTerm};
pub use index_handle::{IndexHandle, IndexStage, IndexTarget};
pub use indexable_document::IndexableDocument;
pub use native_query::{DelegatedSearch, NativeQuery, RankedResultSet};
pub use search_query::SearchQuery;
pub use search_result::{SearchHit, SearchResponse};
pub use settings::{
    CustomRanking, DelegationStrategy, FieldMapping, RankingOrder, ReindexState, SyncSettings,
    TypeMapping,
};

//! # Search Sync Shared
//!
//! This crate defines shared data structures and types used across the search sync ecosystem.
//! It includes the host repository's content model, the documents submitted to the search
//! backend, index handle naming, settings, and the native query representation used by the
//! query delegator.

pub mod types;

pub use types::content_item::{ContentItem, TaxonomyTerm};
pub use types::index_handle::{IndexHandle, IndexStage, IndexTarget};
pub use types::indexable_document::IndexableDocument;
pub use types::native_query::{DelegatedSearch, NativeQuery, RankedResultSet};
pub use types::search_query::SearchQuery;
pub use types::search_result::{SearchHit, SearchResponse};
pub use types::settings::{
    CustomRanking, DelegationStrategy, FieldMapping, RankingOrder, ReindexState, SyncSettings,
    TypeMapping,
};

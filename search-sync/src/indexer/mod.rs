//! Indexing units of work: content batches, taxonomy terms, and promotion.
//!
//! Each unit reads a settings snapshot passed in by the caller and keeps no
//! state between calls.

mod batch;
mod promoter;
mod taxonomy;

pub use batch::{BatchIndexer, BatchReport};
pub use promoter::{IndexPromoter, PromotionFailure, PromotionReport};
pub use taxonomy::{TaxonomyIndexer, TaxonomyReport};

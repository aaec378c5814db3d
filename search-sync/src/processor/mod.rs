//! Processor module for the search sync.
//!
//! Transforms repository content into search documents.

mod document_processor;

pub use document_processor::DocumentProcessor;

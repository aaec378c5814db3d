//! PostgreSQL implementation of the content repository.
//!
//! Reads the host repository's published items and taxonomy terms from the
//! `content_items` and `taxonomy_terms` tables (see `migrations/`).

mod content_repository;

pub use content_repository::PostgresContentRepository;

//! OpenSearch index configuration and mappings.
//!
//! This module defines the index settings and mappings shared by every content
//! type and taxonomy index.

use serde_json::{json, Value};

pub use search_sync_shared::types::index_handle::GENERATION_SEPARATOR;

/// Configuration for the indices created by the provider.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Number of primary shards per index.
    pub number_of_shards: u32,
    /// Number of replicas per index.
    pub number_of_replicas: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            number_of_shards: 1,
            number_of_replicas: 1,
        }
    }
}

impl IndexConfig {
    /// Create a new index configuration.
    ///
    /// # Arguments
    ///
    /// * `number_of_shards` - Primary shards per index
    /// * `number_of_replicas` - Replicas per index
    pub fn new(number_of_shards: u32, number_of_replicas: u32) -> Self {
        Self {
            number_of_shards,
            number_of_replicas,
        }
    }
}

/// Get the concrete index name of one generation of a live index.
///
/// Live names are aliases; each promotion points the alias at a fresh generation.
///
/// # Returns
///
/// The generation index name (e.g., "wp_type_post_g1700000000000")
pub fn generation_index_name(live_name: &str, unix_millis: i64) -> String {
    format!("{}{}{}", live_name, GENERATION_SEPARATOR, unix_millis)
}

/// Get the index settings and mappings for a content or taxonomy index.
///
/// Documents carry three groups of fields, typed by dynamic templates so any
/// field mapping works without per-type index setup:
/// - **searchable.\***: full-text `text` fields
/// - **facets.\***: `keyword` fields for exact filters
/// - **ranking.\***: `double` fields used as tie-breakers
///
/// # Arguments
///
/// * `config` - Shard and replica counts
/// * `alias` - Optional live name the new index is registered under
pub fn get_index_settings(config: &IndexConfig, alias: Option<&str>) -> Value {
    let mut body = json!({
        "settings": {
            "number_of_shards": config.number_of_shards,
            "number_of_replicas": config.number_of_replicas
        },
        "mappings": {
            "dynamic_templates": [
                {
                    "searchable_text": {
                        "path_match": "searchable.*",
                        "mapping": { "type": "text" }
                    }
                },
                {
                    "facet_keywords": {
                        "path_match": "facets.*",
                        "mapping": { "type": "keyword" }
                    }
                },
                {
                    "ranking_values": {
                        "path_match": "ranking.*",
                        "mapping": { "type": "double" }
                    }
                }
            ],
            "properties": {
                "object_id": {
                    "type": "keyword"
                },
                "item_type": {
                    "type": "keyword"
                }
            }
        }
    });

    if let Some(alias) = alias {
        body["aliases"] = json!({ alias: {} });
    }

    body
}

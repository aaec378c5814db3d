//! Sync settings and reindex lifecycle state.
//!
//! `SyncSettings` is an explicit configuration value: the process bootstrap
//! owns it and core operations receive a snapshot of it per call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::index_handle::IndexTarget;

/// Default number of items indexed per batch cursor.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Default index name prefix.
pub const DEFAULT_INDEX_PREFIX: &str = "wp_";

/// Sort direction of a custom ranking attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RankingOrder {
    Asc,
    #[default]
    Desc,
}

/// A numeric attribute used to break ties after text relevance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRanking {
    pub attribute: String,
    #[serde(default)]
    pub order: RankingOrder,
}

/// Which item fields end up where in a search document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Fields matched by full-text queries.
    #[serde(default)]
    pub searchable: Vec<String>,
    /// Fields usable as exact-match filters.
    #[serde(default)]
    pub facets: Vec<String>,
    /// Numeric fields used as tie-breakers, in priority order.
    #[serde(default)]
    pub custom_ranking: Vec<CustomRanking>,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            searchable: vec![
                "title".to_string(),
                "excerpt".to_string(),
                "body".to_string(),
            ],
            facets: vec!["author".to_string()],
            custom_ranking: Vec::new(),
        }
    }
}

/// A content type selected for indexing and its field mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMapping {
    pub name: String,
    #[serde(default)]
    pub mapping: FieldMapping,
}

impl TypeMapping {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mapping: FieldMapping::default(),
        }
    }
}

/// How re-ranking combines the native result list with the external ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DelegationStrategy {
    /// The native executor is bypassed; ranked items are fetched by id.
    #[default]
    ReplaceEntirely,
    /// The native executor still runs; its results are filtered to the ranked set.
    Intersect,
}

/// Settings read by every core operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    pub index_prefix: String,
    pub batch_size: usize,
    pub types: Vec<TypeMapping>,
    #[serde(default)]
    pub delegation: DelegationStrategy,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            index_prefix: DEFAULT_INDEX_PREFIX.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            types: vec![TypeMapping::new("post"), TypeMapping::new("page")],
            delegation: DelegationStrategy::default(),
        }
    }
}

impl SyncSettings {
    /// Field mapping for a type, falling back to the default mapping for
    /// types without an explicit entry.
    pub fn mapping_for(&self, item_type: &str) -> FieldMapping {
        self.types
            .iter()
            .find(|t| t.name == item_type)
            .map(|t| t.mapping.clone())
            .unwrap_or_default()
    }

    /// Names of the configured content types, in configuration order.
    pub fn type_names(&self) -> Vec<String> {
        self.types.iter().map(|t| t.name.clone()).collect()
    }

    /// Returns true if switching from `self` to `other` changes what the
    /// indices contain or are called, which means a full reindex is needed.
    pub fn index_shape_differs(&self, other: &SyncSettings) -> bool {
        self.index_prefix != other.index_prefix || self.types != other.types
    }

    /// Validate the settings.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be greater than zero".to_string());
        }

        if !is_valid_index_segment(&self.index_prefix) {
            return Err(format!(
                "index_prefix '{}' must be lowercase alphanumeric, '_' or '-'",
                self.index_prefix
            ));
        }

        for (position, item_type) in self.types.iter().enumerate() {
            if !IndexTarget::is_valid_type_name(&item_type.name) {
                return Err(format!(
                    "type name '{}' must be non-empty lowercase alphanumeric, '_' or '-', \
                     and must not end in '_temp' or '_g<digits>'",
                    item_type.name
                ));
            }
            if self.types[..position].iter().any(|t| t.name == item_type.name) {
                return Err(format!("type name '{}' is listed twice", item_type.name));
            }
        }

        Ok(())
    }
}

fn is_valid_index_segment(segment: &str) -> bool {
    segment
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

/// The two reindex lifecycle fields written back by the core.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReindexState {
    pub needs_reindex: bool,
    pub last_update: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_for_falls_back_to_default() {
        let mut settings = SyncSettings::default();
        settings.types = vec![TypeMapping {
            name: "product".to_string(),
            mapping: FieldMapping {
                searchable: vec!["title".to_string()],
                facets: vec![],
                custom_ranking: vec![],
            },
        }];

        assert_eq!(settings.mapping_for("product").searchable, vec!["title"]);
        assert_eq!(settings.mapping_for("post"), FieldMapping::default());
    }

    #[test]
    fn test_index_shape_differs() {
        let base = SyncSettings::default();

        let mut batch_only = base.clone();
        batch_only.batch_size = 5;
        batch_only.delegation = DelegationStrategy::Intersect;
        assert!(!base.index_shape_differs(&batch_only));

        let mut prefix = base.clone();
        prefix.index_prefix = "other_".to_string();
        assert!(base.index_shape_differs(&prefix));

        let mut mapping = base.clone();
        mapping.types[0].mapping.facets.push("color".to_string());
        assert!(base.index_shape_differs(&mapping));
    }

    #[test]
    fn test_validate() {
        assert!(SyncSettings::default().validate().is_ok());

        let mut settings = SyncSettings::default();
        settings.batch_size = 0;
        assert!(settings.validate().is_err());

        let mut settings = SyncSettings::default();
        settings.index_prefix = "WP ".to_string();
        assert!(settings.validate().is_err());

        let mut settings = SyncSettings::default();
        settings.types.push(TypeMapping::new(""));
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_colliding_type_names() {
        for name in ["post_temp", "post_g1718000000000", "post"] {
            let mut settings = SyncSettings::default();
            settings.types.push(TypeMapping::new(name));
            assert!(settings.validate().is_err(), "accepted {}", name);
        }
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let settings: SyncSettings = serde_json::from_str(
            r#"{"index_prefix":"wp_","batch_size":10,"types":[{"name":"post"}]}"#,
        )
        .unwrap();

        assert_eq!(settings.delegation, DelegationStrategy::ReplaceEntirely);
        assert_eq!(settings.types[0].mapping, FieldMapping::default());
    }
}

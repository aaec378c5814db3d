//! Index handles and backend index naming.
//!
//! Every indexed target has a live name and a staging name derived from the
//! configured prefix:
//!
//! | target | live | staging |
//! |---|---|---|
//! | content type `post` | `{prefix}type_post` | `{prefix}type_post_temp` |
//! | taxonomies | `{prefix}terms` | `{prefix}terms_temp` |

use std::fmt;

use serde::{Deserialize, Serialize};

/// Suffix appended to a live name to form its staging name.
pub const STAGING_SUFFIX: &str = "_temp";

/// Separator between a live name and the timestamp of one of its generations.
pub const GENERATION_SEPARATOR: &str = "_g";

const TYPE_SEGMENT: &str = "type_";
const TAXONOMY_SEGMENT: &str = "terms";

/// What an index holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum IndexTarget {
    /// Documents for one content type.
    ContentType(String),
    /// Documents for every taxonomy term.
    Taxonomies,
}

impl IndexTarget {
    pub fn content_type(name: impl Into<String>) -> Self {
        Self::ContentType(name.into())
    }

    /// Returns true if `name` can be used as a content type without its index names
    /// colliding with another type's staging index or with a live generation.
    ///
    /// Valid names are non-empty lowercase alphanumeric, `_` or `-`, and do not end
    /// in `_temp` or `_g<digits>`.
    pub fn is_valid_type_name(name: &str) -> bool {
        !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
            && !name.ends_with(STAGING_SUFFIX)
            && !has_generation_suffix(name)
    }
}

fn has_generation_suffix(name: &str) -> bool {
    name.rsplit_once(GENERATION_SEPARATOR)
        .is_some_and(|(_, digits)| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

impl fmt::Display for IndexTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexTarget::ContentType(name) => write!(f, "type:{}", name),
            IndexTarget::Taxonomies => write!(f, "taxonomies"),
        }
    }
}

/// Whether an index is visible to queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStage {
    Staging,
    Live,
}

/// Identifies a named index on the search backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexHandle {
    pub target: IndexTarget,
    pub stage: IndexStage,
}

impl IndexHandle {
    pub fn staging(target: IndexTarget) -> Self {
        Self {
            target,
            stage: IndexStage::Staging,
        }
    }

    pub fn live(target: IndexTarget) -> Self {
        Self {
            target,
            stage: IndexStage::Live,
        }
    }

    /// Build the backend index name for this handle.
    ///
    /// # Example
    ///
    /// ```
    /// use search_sync_shared::{IndexHandle, IndexTarget};
    ///
    /// let handle = IndexHandle::staging(IndexTarget::content_type("post"));
    /// assert_eq!(handle.index_name("wp_"), "wp_type_post_temp");
    /// ```
    pub fn index_name(&self, prefix: &str) -> String {
        let live = match &self.target {
            IndexTarget::ContentType(name) => format!("{}{}{}", prefix, TYPE_SEGMENT, name),
            IndexTarget::Taxonomies => format!("{}{}", prefix, TAXONOMY_SEGMENT),
        };
        match self.stage {
            IndexStage::Live => live,
            IndexStage::Staging => format!("{}{}", live, STAGING_SUFFIX),
        }
    }

    /// Recover a handle from a backend index name.
    ///
    /// Returns `None` for names outside the prefix or not following the naming
    /// scheme.
    pub fn parse(prefix: &str, index_name: &str) -> Option<Self> {
        let rest = index_name.strip_prefix(prefix)?;
        let (rest, stage) = match rest.strip_suffix(STAGING_SUFFIX) {
            Some(stripped) => (stripped, IndexStage::Staging),
            None => (rest, IndexStage::Live),
        };

        let target = if rest == TAXONOMY_SEGMENT {
            IndexTarget::Taxonomies
        } else {
            let name = rest.strip_prefix(TYPE_SEGMENT)?;
            if name.is_empty() {
                return None;
            }
            IndexTarget::ContentType(name.to_string())
        };

        Some(Self { target, stage })
    }

    /// The same target at the other stage.
    pub fn counterpart(&self) -> Self {
        let stage = match self.stage {
            IndexStage::Staging => IndexStage::Live,
            IndexStage::Live => IndexStage::Staging,
        };
        Self {
            target: self.target.clone(),
            stage,
        }
    }
}

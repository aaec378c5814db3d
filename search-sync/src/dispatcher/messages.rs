//! Control message types for the batch dispatcher.
//!
//! Control messages arrive as plain string tokens whose parts are joined by
//! `__`. They are parsed once, here, and the rest of the dispatcher only sees
//! the tagged form.

use std::fmt;

use serde::Serialize;

use search_sync_shared::IndexTarget;

/// Separator between the parts of a control token.
pub const TOKEN_SEPARATOR: &str = "__";

/// Why a token was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// The token does not match any known shape.
    UnknownShape,
    /// A batch token whose part index is not an unsigned integer.
    NonNumericCursor,
    /// A batch token whose type name would address another type's index.
    InvalidTypeName,
}

/// A parsed control message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlMessage {
    /// The `reindex` token submitted alongside the real work. No effect.
    Placeholder,
    /// Ensure every configured live index exists.
    HandleIndexCreation,
    /// Index every taxonomy term into staging.
    IndexTaxonomies,
    /// Promote every staging index.
    MoveIndexes,
    /// Index one batch of one content type.
    IndexBatch { item_type: String, cursor: u64 },
    /// Anything else. No effect and no error.
    Ignored { reason: IgnoreReason },
}

impl ControlMessage {
    /// Parse a raw token.
    ///
    /// # Example
    ///
    /// ```
    /// use search_sync::dispatcher::ControlMessage;
    ///
    /// assert_eq!(
    ///     ControlMessage::parse("type__post__3"),
    ///     ControlMessage::IndexBatch { item_type: "post".to_string(), cursor: 3 }
    /// );
    /// ```
    pub fn parse(token: &str) -> Self {
        let parts: Vec<&str> = token.split(TOKEN_SEPARATOR).collect();

        match parts.as_slice() {
            ["reindex"] => Self::Placeholder,
            ["handle_index_creation"] => Self::HandleIndexCreation,
            ["index_taxonomies"] => Self::IndexTaxonomies,
            ["move_indexes"] => Self::MoveIndexes,
            ["type", item_type, _] if !item_type.is_empty()
                && !IndexTarget::is_valid_type_name(item_type) =>
            {
                Self::Ignored {
                    reason: IgnoreReason::InvalidTypeName,
                }
            }
            ["type", item_type, cursor] if !item_type.is_empty() => {
                match parse_cursor(cursor) {
                    Some(cursor) => Self::IndexBatch {
                        item_type: item_type.to_string(),
                        cursor,
                    },
                    None => Self::Ignored {
                        reason: IgnoreReason::NonNumericCursor,
                    },
                }
            }
            _ => Self::Ignored {
                reason: IgnoreReason::UnknownShape,
            },
        }
    }

    /// Format the message back into its token, if it has one.
    pub fn to_token(&self) -> Option<String> {
        match self {
            Self::Placeholder => Some("reindex".to_string()),
            Self::HandleIndexCreation => Some("handle_index_creation".to_string()),
            Self::IndexTaxonomies => Some("index_taxonomies".to_string()),
            Self::MoveIndexes => Some("move_indexes".to_string()),
            Self::IndexBatch { item_type, cursor } => Some(format!(
                "type{sep}{}{sep}{}",
                item_type,
                cursor,
                sep = TOKEN_SEPARATOR
            )),
            Self::Ignored { .. } => None,
        }
    }

    /// Returns true if the message carries a batch of content.
    pub fn is_batch(&self) -> bool {
        matches!(self, Self::IndexBatch { .. })
    }
}

impl fmt::Display for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignored { reason } => write!(f, "ignored ({:?})", reason),
            other => write!(f, "{}", other.to_token().unwrap_or_default()),
        }
    }
}

/// Only plain decimal digits are accepted, no sign and no whitespace.
fn parse_cursor(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

//! Config/state context trait definition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use search_sync_shared::{ReindexState, SyncSettings};

/// Holds the settings the core reads and the reindex lifecycle fields it writes.
///
/// The core only ever writes `needs_reindex` and `last_update`; settings are
/// replaced by whoever owns the process configuration.
#[async_trait]
pub trait ConfigContext: Send + Sync {
    /// Snapshot of the current settings.
    async fn settings(&self) -> SyncSettings;

    /// Snapshot of the reindex lifecycle fields.
    async fn reindex_state(&self) -> ReindexState;

    async fn set_needs_reindex(&self, needs_reindex: bool);

    async fn touch_last_update(&self, at: DateTime<Utc>);

    /// Install new settings.
    ///
    /// Returns `Ok(true)` when the change affects the index shape, in which case
    /// `needs_reindex` has been set. Returns an error message and leaves the
    /// current settings in place if the new settings are invalid.
    async fn replace_settings(&self, settings: SyncSettings) -> Result<bool, String>;
}

//! Config context held in process memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use search_sync_shared::{ReindexState, SyncSettings};
use tokio::sync::RwLock;
use tracing::info;

use crate::interfaces::ConfigContext;

/// Settings and reindex state kept behind a lock for the lifetime of the process.
///
/// Settings are replaced as a whole; readers always get a consistent snapshot.
#[derive(Debug, Default)]
pub struct InMemoryConfigContext {
    settings: RwLock<SyncSettings>,
    state: RwLock<ReindexState>,
}

impl InMemoryConfigContext {
    pub fn new(settings: SyncSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
            state: RwLock::new(ReindexState::default()),
        }
    }

    /// Start from an existing reindex state, e.g. one restored by the host.
    pub fn with_state(settings: SyncSettings, state: ReindexState) -> Self {
        Self {
            settings: RwLock::new(settings),
            state: RwLock::new(state),
        }
    }
}

#[async_trait]
impl ConfigContext for InMemoryConfigContext {
    async fn settings(&self) -> SyncSettings {
        self.settings.read().await.clone()
    }

    async fn reindex_state(&self) -> ReindexState {
        self.state.read().await.clone()
    }

    async fn set_needs_reindex(&self, needs_reindex: bool) {
        self.state.write().await.needs_reindex = needs_reindex;
    }

    async fn touch_last_update(&self, at: DateTime<Utc>) {
        self.state.write().await.last_update = Some(at);
    }

    async fn replace_settings(&self, settings: SyncSettings) -> Result<bool, String> {
        settings.validate()?;

        let mut current = self.settings.write().await;
        let shape_changed = current.index_shape_differs(&settings);
        *current = settings;
        drop(current);

        if shape_changed {
            self.set_needs_reindex(true).await;
            info!("Settings change affects index shape, reindex required");
        }

        Ok(shape_changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_sync_shared::{DelegationStrategy, TypeMapping};

    #[tokio::test]
    async fn test_state_round_trip() {
        let context = InMemoryConfigContext::new(SyncSettings::default());
        assert_eq!(context.reindex_state().await, ReindexState::default());

        let at = Utc::now();
        context.set_needs_reindex(true).await;
        context.touch_last_update(at).await;

        let state = context.reindex_state().await;
        assert!(state.needs_reindex);
        assert_eq!(state.last_update, Some(at));
    }

    #[tokio::test]
    async fn test_replace_settings_shape_change_flags_reindex() {
        let context = InMemoryConfigContext::new(SyncSettings::default());

        let mut settings = SyncSettings::default();
        settings.types.push(TypeMapping::new("product"));

        assert_eq!(context.replace_settings(settings.clone()).await, Ok(true));
        assert!(context.reindex_state().await.needs_reindex);
        assert_eq!(context.settings().await, settings);
    }

    #[tokio::test]
    async fn test_replace_settings_without_shape_change() {
        let context = InMemoryConfigContext::new(SyncSettings::default());

        let settings = SyncSettings {
            delegation: DelegationStrategy::Intersect,
            batch_size: 50,
            ..SyncSettings::default()
        };

        assert_eq!(context.replace_settings(settings).await, Ok(false));
        assert!(!context.reindex_state().await.needs_reindex);
        assert_eq!(context.settings().await.batch_size, 50);
    }

    #[tokio::test]
    async fn test_replace_settings_rejects_invalid() {
        let context = InMemoryConfigContext::new(SyncSettings::default());

        let settings = SyncSettings {
            batch_size: 0,
            ..SyncSettings::default()
        };

        assert!(context.replace_settings(settings).await.is_err());
        assert_eq!(context.settings().await, SyncSettings::default());
    }
}

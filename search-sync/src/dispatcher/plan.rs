//! Reindex plan: the control messages a driving client sends for a full reindex.

use std::collections::BTreeMap;

use serde::Serialize;

use super::messages::ControlMessage;
use search_sync_shared::{ReindexState, SyncSettings};

/// A full reindex as ordered groups of control tokens.
///
/// Groups must be sent in order. Tokens inside one group may be sent in any
/// order or split across requests; batch groups of different types may run
/// concurrently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReindexPlan {
    pub batch_size: usize,
    /// Published items per configured type.
    pub item_counts: BTreeMap<String, u64>,
    /// Terms per taxonomy.
    pub term_counts: BTreeMap<String, u64>,
    pub state: ReindexState,
    pub groups: Vec<Vec<String>>,
}

impl ReindexPlan {
    /// Build the plan for the configured types.
    ///
    /// Types missing from `item_counts` get no batch tokens.
    pub fn build(
        settings: &SyncSettings,
        item_counts: BTreeMap<String, u64>,
        term_counts: BTreeMap<String, u64>,
        state: ReindexState,
    ) -> Self {
        let batch_size = settings.batch_size.max(1) as u64;

        let mut groups = vec![token_group([ControlMessage::HandleIndexCreation])];

        for item_type in settings.type_names() {
            let count = item_counts.get(&item_type).copied().unwrap_or(0);
            let batches = count.div_ceil(batch_size);
            if batches == 0 {
                continue;
            }
            groups.push(token_group((0..batches).map(|cursor| {
                ControlMessage::IndexBatch {
                    item_type: item_type.clone(),
                    cursor,
                }
            })));
        }

        groups.push(token_group([ControlMessage::IndexTaxonomies]));
        groups.push(token_group([ControlMessage::MoveIndexes]));

        Self {
            batch_size: settings.batch_size,
            item_counts,
            term_counts,
            state,
            groups,
        }
    }

    /// Every token of the plan, in order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().flatten().map(String::as_str)
    }
}

fn token_group(messages: impl IntoIterator<Item = ControlMessage>) -> Vec<String> {
    messages.into_iter().filter_map(|m| m.to_token()).collect()
}

//! Query delegator and re-ranker.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::errors::SyncError;
use search_sync_repository::{parse_object_id, ContentRepository, SearchIndexService};
use search_sync_shared::{
    ContentItem, CustomRanking, DelegatedSearch, DelegationStrategy, NativeQuery,
    RankedResultSet, SearchQuery, SyncSettings,
};

/// Hands native search queries to the external index and rebuilds the native
/// result list in the index's ranking order.
///
/// The delegator keeps no per-query state: everything `reorder_results` needs is
/// carried by the `DelegatedSearch` marker left on the query by `intercept_query`.
pub struct QueryDelegator {
    search: Arc<SearchIndexService>,
    content: Arc<dyn ContentRepository>,
}

impl QueryDelegator {
    pub fn new(search: Arc<SearchIndexService>, content: Arc<dyn ContentRepository>) -> Self {
        Self { search, content }
    }

    /// Mark a native search query as delegated.
    ///
    /// Under `ReplaceEntirely` the search term is removed from the native query and
    /// `suppress_native` is set, so the native executor returns an empty placeholder.
    /// Under `Intersect` the native query keeps its term and runs as usual.
    ///
    /// Returns true if the query is delegated. Non-search queries are left untouched.
    pub fn intercept_query(&self, settings: &SyncSettings, query: &mut NativeQuery) -> bool {
        if query.is_delegated() {
            return true;
        }
        if !query.is_search_request() {
            return false;
        }

        let term = match settings.delegation {
            DelegationStrategy::ReplaceEntirely => {
                query.suppress_native = true;
                query.search_term.take()
            }
            DelegationStrategy::Intersect => query.search_term.clone(),
        }
        .unwrap_or_default();

        query.delegated = Some(DelegatedSearch {
            term,
            facet_filters: query.facet_filters.clone(),
        });

        debug!(strategy = ?settings.delegation, "Delegated search query");
        true
    }

    /// Rebuild the native result list in the external index's ranking order.
    ///
    /// Ranked ids with no native item are dropped and counted. Under `Intersect`, native
    /// items the index did not rank are dropped too. Queries that were not delegated
    /// return `native_items` unchanged.
    ///
    /// # Returns
    ///
    /// * `Ok(RankedResultSet)` - Items in rank order, without duplicates
    /// * `Err(SyncError)` - If the search backend or the content repository failed
    #[instrument(skip(self, settings, query, native_items), fields(native_count = native_items.len()))]
    pub async fn reorder_results(
        &self,
        settings: &SyncSettings,
        query: &NativeQuery,
        native_items: Vec<ContentItem>,
    ) -> Result<RankedResultSet, SyncError> {
        let Some(delegated) = &query.delegated else {
            return Ok(RankedResultSet::passthrough(native_items));
        };

        let search_query = build_search_query(settings, query, delegated);
        let response = self
            .search
            .search(&settings.index_prefix, &search_query)
            .await?;

        let mut seen = HashSet::new();
        let ranked_ids: Vec<u64> = response
            .ranked_object_ids()
            .filter_map(|id| parse_object_id(id).ok())
            .filter(|id| seen.insert(*id))
            .collect();

        let mut by_id: HashMap<u64, ContentItem> = HashMap::with_capacity(native_items.len());
        for item in native_items {
            by_id.entry(item.id).or_insert(item);
        }

        if settings.delegation == DelegationStrategy::ReplaceEntirely {
            let missing: Vec<u64> = ranked_ids
                .iter()
                .copied()
                .filter(|id| !by_id.contains_key(id))
                .collect();
            if !missing.is_empty() {
                for item in self.content.get_items(&missing).await? {
                    by_id.entry(item.id).or_insert(item);
                }
            }
        }

        let mut items = Vec::with_capacity(ranked_ids.len());
        let mut dropped = 0;
        for id in &ranked_ids {
            match by_id.remove(id) {
                Some(item) => items.push(item),
                None => dropped += 1,
            }
        }

        debug!(
            ranked = ranked_ids.len(),
            returned = items.len(),
            dropped = dropped,
            "Re-ranked results"
        );

        Ok(RankedResultSet {
            ranked_ids,
            items,
            dropped,
        })
    }
}

/// The backend query for a delegated native query.
fn build_search_query(
    settings: &SyncSettings,
    query: &NativeQuery,
    delegated: &DelegatedSearch,
) -> SearchQuery {
    let item_types = if query.item_types.is_empty() {
        settings.type_names()
    } else {
        query.item_types.clone()
    };

    let mut custom_ranking: Vec<CustomRanking> = Vec::new();
    for item_type in &item_types {
        for ranking in settings.mapping_for(item_type).custom_ranking {
            if !custom_ranking
                .iter()
                .any(|r| r.attribute == ranking.attribute)
            {
                custom_ranking.push(ranking);
            }
        }
    }

    SearchQuery::new(delegated.term.clone(), item_types)
        .with_facet_filters(delegated.facet_filters.clone())
        .with_custom_ranking(custom_ranking)
        .with_limit(query.per_page)
        .with_offset(query.offset())
}

//! Shared fixtures for the search sync integration tests.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use search_sync::Dependencies;
use search_sync_repository::{
    BatchOperationResult, BatchOperationSummary, ContentRepository, ContentRepositoryError,
    InMemoryConfigContext, SearchIndexError, SearchIndexProvider, SearchIndexService,
};
use search_sync_shared::{
    ContentItem, IndexableDocument, ReindexState, SearchHit, SearchQuery, SearchResponse,
    SyncSettings, TaxonomyTerm, TypeMapping,
};

#[derive(Default)]
struct IndexState {
    indices: BTreeMap<String, BTreeMap<String, IndexableDocument>>,
    ranking: Option<Vec<String>>,
    failing_promotions: HashSet<String>,
    failing_search: bool,
    failing_bulk: HashSet<String>,
    failing_listing: bool,
    bulk_requests: usize,
}

/// Search backend held in memory.
///
/// Clones share state, so a test keeps one handle while the service owns another.
#[derive(Clone, Default)]
pub struct MemorySearchIndex {
    state: Arc<Mutex<IndexState>>,
}

impl MemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return these object ids, in this order, for every search.
    pub fn script_ranking(&self, object_ids: &[&str]) {
        self.state.lock().unwrap().ranking =
            Some(object_ids.iter().map(|id| id.to_string()).collect());
    }

    pub fn fail_promotion_of(&self, live_name: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_promotions
            .insert(live_name.to_string());
    }

    /// Reject every bulk write into `index_name`.
    pub fn fail_bulk_into(&self, index_name: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_bulk
            .insert(index_name.to_string());
    }

    pub fn fail_listing(&self) {
        self.state.lock().unwrap().failing_listing = true;
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.failing_promotions.clear();
        state.failing_bulk.clear();
        state.failing_search = false;
        state.failing_listing = false;
    }

    pub fn fail_search(&self) {
        self.state.lock().unwrap().failing_search = true;
    }

    pub fn index_names(&self) -> Vec<String> {
        self.state.lock().unwrap().indices.keys().cloned().collect()
    }

    pub fn has_index(&self, name: &str) -> bool {
        self.state.lock().unwrap().indices.contains_key(name)
    }

    /// Object ids stored in an index, in numeric order where they are numeric.
    pub fn object_ids(&self, name: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let mut ids: Vec<String> = state
            .indices
            .get(name)
            .map(|docs| docs.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort_by_key(|id| (id.parse::<u64>().unwrap_or(u64::MAX), id.clone()));
        ids
    }

    pub fn document(&self, name: &str, object_id: &str) -> Option<IndexableDocument> {
        self.state
            .lock()
            .unwrap()
            .indices
            .get(name)
            .and_then(|docs| docs.get(object_id).cloned())
    }

    pub fn bulk_requests(&self) -> usize {
        self.state.lock().unwrap().bulk_requests
    }
}

fn matches_pattern(pattern: &str, name: &str) -> bool {
    match pattern.split_once('*') {
        Some((head, tail)) => {
            name.len() >= head.len() + tail.len() && name.starts_with(head) && name.ends_with(tail)
        }
        None => pattern == name,
    }
}

fn matches_query(doc: &IndexableDocument, query: &SearchQuery) -> bool {
    let term = query.query.to_lowercase();
    let text_match = doc.searchable.values().any(|value| {
        value
            .as_str()
            .is_some_and(|text| text.to_lowercase().contains(&term))
    });
    let facets_match = query.facet_filters.iter().all(|(facet, wanted)| {
        doc.facets
            .get(facet)
            .and_then(|value| value.as_str())
            .is_some_and(|value| value == wanted)
    });
    text_match && facets_match
}

#[async_trait]
impl SearchIndexProvider for MemorySearchIndex {
    async fn ensure_index_exists(&self, live_name: &str) -> Result<(), SearchIndexError> {
        self.state
            .lock()
            .unwrap()
            .indices
            .entry(live_name.to_string())
            .or_default();
        Ok(())
    }

    async fn ensure_staging_index(&self, staging_name: &str) -> Result<(), SearchIndexError> {
        self.ensure_index_exists(staging_name).await
    }

    async fn bulk_upsert_documents(
        &self,
        index_name: &str,
        documents: &[IndexableDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let mut state = self.state.lock().unwrap();
        state.bulk_requests += 1;
        if state.failing_bulk.contains(index_name) {
            return Err(SearchIndexError::bulk_index(format!(
                "bulk request to {} rejected",
                index_name
            )));
        }
        let index = state
            .indices
            .get_mut(index_name)
            .ok_or_else(|| SearchIndexError::index(format!("no such index: {}", index_name)))?;

        let results = documents
            .iter()
            .map(|doc| {
                index.insert(doc.object_id.clone(), doc.clone());
                BatchOperationResult::succeeded(doc.object_id.clone())
            })
            .collect();
        Ok(BatchOperationSummary::from_results(results))
    }

    async fn list_indices(&self, pattern: &str) -> Result<Vec<String>, SearchIndexError> {
        let state = self.state.lock().unwrap();
        if state.failing_listing {
            return Err(SearchIndexError::connection("connection reset"));
        }
        Ok(state
            .indices
            .keys()
            .filter(|name| matches_pattern(pattern, name))
            .cloned()
            .collect())
    }

    async fn promote(&self, staging_name: &str, live_name: &str) -> Result<(), SearchIndexError> {
        let mut state = self.state.lock().unwrap();
        if state.failing_promotions.contains(live_name) {
            return Err(SearchIndexError::promotion(format!(
                "cluster rejected alias swap for {}",
                live_name
            )));
        }
        let staged = state.indices.remove(staging_name).ok_or_else(|| {
            SearchIndexError::promotion(format!("staging index {} not found", staging_name))
        })?;
        state.indices.insert(live_name.to_string(), staged);
        Ok(())
    }

    async fn search(
        &self,
        index_names: &[String],
        query: &SearchQuery,
    ) -> Result<SearchResponse, SearchIndexError> {
        let state = self.state.lock().unwrap();
        if state.failing_search {
            return Err(SearchIndexError::connection("connection refused"));
        }

        let hits: Vec<SearchHit> = match &state.ranking {
            Some(ranking) => ranking
                .iter()
                .map(|id| SearchHit {
                    object_id: id.clone(),
                    item_type: query.item_types.first().cloned().unwrap_or_default(),
                    relevance_score: 1.0,
                })
                .collect(),
            None => index_names
                .iter()
                .filter_map(|name| state.indices.get(name))
                .flat_map(|docs| docs.values())
                .filter(|doc| matches_query(doc, query))
                .map(|doc| SearchHit {
                    object_id: doc.object_id.clone(),
                    item_type: doc.item_type.clone(),
                    relevance_score: 1.0,
                })
                .collect(),
        };

        let total = hits.len() as u64;
        let page = hits
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect();
        Ok(SearchResponse::new(page, total, 1))
    }
}

/// Content repository held in memory.
#[derive(Default)]
pub struct MemoryContent {
    items: Mutex<Vec<ContentItem>>,
    terms: Vec<TaxonomyTerm>,
    reads: Mutex<usize>,
}

impl MemoryContent {
    pub fn new(items: Vec<ContentItem>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Self::default()
        }
    }

    pub fn with_terms(mut self, terms: Vec<TaxonomyTerm>) -> Self {
        self.terms = terms;
        self
    }

    pub fn delete(&self, id: u64) {
        self.items.lock().unwrap().retain(|item| item.id != id);
    }

    /// Number of list and get calls served.
    pub fn reads(&self) -> usize {
        *self.reads.lock().unwrap()
    }

    fn record_read(&self) {
        *self.reads.lock().unwrap() += 1;
    }
}

#[async_trait]
impl ContentRepository for MemoryContent {
    async fn list_items(
        &self,
        item_type: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ContentItem>, ContentRepositoryError> {
        self.record_read();
        let mut items: Vec<ContentItem> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| item.item_type == item_type)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.id);
        Ok(items.into_iter().skip(offset).take(limit).collect())
    }

    async fn get_item(&self, id: u64) -> Result<Option<ContentItem>, ContentRepositoryError> {
        self.record_read();
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.id == id)
            .cloned())
    }

    async fn count_items(&self, item_type: &str) -> Result<u64, ContentRepositoryError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| item.item_type == item_type)
            .count() as u64)
    }

    async fn list_taxonomies(&self) -> Result<Vec<String>, ContentRepositoryError> {
        let mut taxonomies: Vec<String> = self.terms.iter().map(|t| t.taxonomy.clone()).collect();
        taxonomies.sort();
        taxonomies.dedup();
        Ok(taxonomies)
    }

    async fn list_terms(&self, taxonomy: &str) -> Result<Vec<TaxonomyTerm>, ContentRepositoryError> {
        Ok(self
            .terms
            .iter()
            .filter(|t| t.taxonomy == taxonomy)
            .cloned()
            .collect())
    }
}

pub fn post(id: u64, title: &str) -> ContentItem {
    ContentItem::new(id, "post", title).with_author("ada")
}

pub fn page(id: u64, title: &str) -> ContentItem {
    ContentItem::new(id, "page", title)
}

pub fn term(term_id: u64, taxonomy: &str, name: &str) -> TaxonomyTerm {
    TaxonomyTerm {
        term_id,
        taxonomy: taxonomy.to_string(),
        name: name.to_string(),
        slug: name.to_lowercase(),
        item_count: 1,
    }
}

pub fn settings(batch_size: usize, types: &[&str]) -> SyncSettings {
    SyncSettings {
        batch_size,
        types: types.iter().map(|t| TypeMapping::new(*t)).collect(),
        ..SyncSettings::default()
    }
}

pub fn tokens(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|t| t.to_string()).collect()
}

/// Everything a test needs to drive the sync and inspect its collaborators.
pub struct Harness {
    pub deps: Dependencies,
    pub index: MemorySearchIndex,
    pub content: Arc<MemoryContent>,
}

impl Harness {
    pub fn new(settings: SyncSettings, content: MemoryContent) -> Self {
        Self::with_state(settings, content, ReindexState::default())
    }

    pub fn with_state(settings: SyncSettings, content: MemoryContent, state: ReindexState) -> Self {
        let index = MemorySearchIndex::new();
        let content = Arc::new(content);
        let deps = Dependencies::from_components(
            Arc::new(InMemoryConfigContext::with_state(settings, state)),
            content.clone(),
            SearchIndexService::new(Box::new(index.clone())),
        );

        Self {
            deps,
            index,
            content,
        }
    }
}

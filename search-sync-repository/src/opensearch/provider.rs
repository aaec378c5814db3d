//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust crate.
//!
//! Live names are aliases over generation indices (`{live}_g{millis}`). Promotion
//! clones the staging index into a fresh generation and swaps the alias in a single
//! `_aliases` call, so readers switch from the old contents to the new ones at once.

use async_trait::async_trait;
use opensearch::{
    cat::CatIndicesParts,
    cluster::ClusterHealthParts,
    http::request::JsonBody,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{
        IndicesCloneParts, IndicesCreateParts, IndicesDeleteParts, IndicesExistsAliasParts,
        IndicesExistsParts, IndicesGetAliasParts, IndicesGetSettingsParts,
        IndicesPutSettingsParts, IndicesRefreshParts,
    },
    params::WaitForStatus,
    BulkParts, OpenSearch, SearchParts,
};
use search_sync_shared::{
    IndexableDocument, RankingOrder, SearchHit, SearchQuery, SearchResponse,
};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::index_config::{
    generation_index_name, get_index_settings, IndexConfig, GENERATION_SEPARATOR,
};
use crate::types::{BatchOperationResult, BatchOperationSummary};

/// How long promotion waits for a cloned generation to become searchable.
/// Kept below the service's promotion timeout so the wait never outlives the caller.
const CLONE_HEALTH_TIMEOUT: &str = "20s";

const WRITE_BLOCK_SETTING: &str = "index.blocks.write";

/// OpenSearch provider implementation.
///
/// Provides staging writes, alias-swap promotion, and full-text search using
/// OpenSearch as the backend.
///
/// # Example
///
/// ```ignore
/// use search_sync_repository::opensearch::{IndexConfig, OpenSearchProvider};
///
/// let provider = OpenSearchProvider::new("http://localhost:9200", IndexConfig::default()).await?;
///
/// provider.ensure_staging_index("wp_type_post_temp").await?;
/// provider.bulk_upsert_documents("wp_type_post_temp", &documents).await?;
/// provider.promote("wp_type_post_temp", "wp_type_post").await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
    index_config: IndexConfig,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `index_config` - Shard and replica settings for created indices
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub async fn new(url: &str, index_config: IndexConfig) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            shards = index_config.number_of_shards,
            replicas = index_config.number_of_replicas,
            "Created OpenSearch provider"
        );

        Ok(Self {
            client,
            index_config,
        })
    }

    /// Turn a non-success response into an error built by `to_error`.
    async fn ensure_success(
        response: Response,
        action: &str,
        to_error: fn(String) -> SearchIndexError,
    ) -> Result<Response, SearchIndexError> {
        let status = response.status_code();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %error_body, action = %action, "OpenSearch request failed");
        Err(to_error(format!(
            "{} failed with status {}: {}",
            action, status, error_body
        )))
    }

    async fn index_exists(&self, name: &str) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[name]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        Ok(response.status_code().is_success())
    }

    async fn create_index(&self, name: &str, body: Value) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(name))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            return Ok(());
        }

        // A concurrent writer created the same index first.
        let error_body = response.text().await.unwrap_or_default();
        if error_body.contains("resource_already_exists_exception") {
            debug!(index = %name, "Index already exists");
            return Ok(());
        }

        error!(status = %status, body = %error_body, index = %name, "Index creation failed");
        Err(SearchIndexError::index_creation(format!(
            "Creating {} failed with status {}: {}",
            name, status, error_body
        )))
    }

    async fn delete_index(&self, name: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[name]))
            .send()
            .await
            .map_err(|e| SearchIndexError::index(e.to_string()))?;

        if response.status_code().as_u16() == 404 {
            return Ok(());
        }
        Self::ensure_success(response, "Delete index", SearchIndexError::index).await?;
        Ok(())
    }

    /// Concrete indices currently behind `alias`.
    async fn alias_targets(&self, alias: &str) -> Result<Vec<String>, SearchIndexError> {
        let response = self
            .client
            .indices()
            .get_alias(IndicesGetAliasParts::Name(&[alias]))
            .send()
            .await
            .map_err(|e| SearchIndexError::promotion(e.to_string()))?;

        if response.status_code().as_u16() == 404 {
            return Ok(Vec::new());
        }

        let response =
            Self::ensure_success(response, "Get alias", SearchIndexError::promotion).await?;
        let body = response
            .json::<Value>()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        Ok(parse_alias_targets(&body))
    }

    /// Set or clear the write block on an index.
    async fn set_write_block(&self, name: &str, blocked: bool) -> Result<(), SearchIndexError> {
        let value = if blocked { json!(true) } else { Value::Null };
        let response = self
            .client
            .indices()
            .put_settings(IndicesPutSettingsParts::Index(&[name]))
            .body(json!({ WRITE_BLOCK_SETTING: value }))
            .send()
            .await
            .map_err(|e| SearchIndexError::index(e.to_string()))?;
        Self::ensure_success(response, "Update write block", SearchIndexError::index).await?;
        Ok(())
    }

    async fn is_write_blocked(&self, name: &str) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .indices()
            .get_settings(IndicesGetSettingsParts::IndexName(
                &[name],
                &[WRITE_BLOCK_SETTING],
            ))
            .flat_settings(true)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let response = Self::ensure_success(response, "Get settings", SearchIndexError::index).await?;
        let body = response
            .json::<Value>()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        Ok(parse_write_block(&body, name))
    }

    /// Clear a write block left behind by an interrupted promotion. Best-effort.
    async fn release_staging(&self, staging_name: &str) {
        if let Err(e) = self.set_write_block(staging_name, false).await {
            warn!(index = %staging_name, error = %e, "Failed to clear write block on staging index");
        }
    }

    /// Delete generations of `live_name` that no alias points at any more. Best-effort.
    async fn delete_orphan_generations(&self, live_name: &str, current: &str) {
        let pattern = format!("{}{}*", live_name, GENERATION_SEPARATOR);
        let candidates = match self.list_indices(&pattern).await {
            Ok(names) => names,
            Err(e) => {
                warn!(live = %live_name, error = %e, "Failed to list generations");
                return;
            }
        };

        for orphan in candidates
            .iter()
            .filter(|name| name.as_str() != current && is_generation_of(live_name, name))
        {
            match self.delete_index(orphan).await {
                Ok(()) => info!(index = %orphan, "Deleted orphaned generation"),
                Err(e) => warn!(index = %orphan, error = %e, "Failed to delete orphaned generation"),
            }
        }
    }

    /// Freeze the staging index and copy it into a new generation.
    async fn clone_into_generation(
        &self,
        staging_name: &str,
        generation: &str,
    ) -> Result<(), SearchIndexError> {
        self.set_write_block(staging_name, true)
            .await
            .map_err(|e| SearchIndexError::promotion(e.to_string()))?;

        let response = self
            .client
            .indices()
            .clone(IndicesCloneParts::IndexTarget(staging_name, generation))
            .body(json!({ "settings": { "index.blocks.write": null } }))
            .send()
            .await
            .map_err(|e| SearchIndexError::promotion(e.to_string()))?;
        Self::ensure_success(response, "Clone", SearchIndexError::promotion).await?;

        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::Index(&[generation]))
            .wait_for_status(WaitForStatus::Yellow)
            .timeout(CLONE_HEALTH_TIMEOUT)
            .send()
            .await
            .map_err(|e| SearchIndexError::promotion(e.to_string()))?;
        Self::ensure_success(response, "Cluster health", SearchIndexError::promotion).await?;

        Ok(())
    }

    /// Point `live_name` at `generation`, detaching everything it pointed at before.
    async fn swap_alias(
        &self,
        live_name: &str,
        generation: &str,
    ) -> Result<Vec<String>, SearchIndexError> {
        let previous = self.alias_targets(live_name).await?;
        // A concrete index squatting on the live name is replaced in the same call.
        let squatter = previous.is_empty() && self.index_exists(live_name).await?;

        let actions = build_alias_actions(live_name, generation, &previous, squatter);

        let response = self
            .client
            .indices()
            .update_aliases()
            .body(actions)
            .send()
            .await
            .map_err(|e| SearchIndexError::promotion(e.to_string()))?;
        Self::ensure_success(response, "Alias swap", SearchIndexError::promotion).await?;

        Ok(previous)
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchProvider {
    /// Ensure the live alias exists, creating an empty generation behind it if not.
    async fn ensure_index_exists(&self, live_name: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .exists_alias(IndicesExistsAliasParts::Name(&[live_name]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if response.status_code().is_success() || self.index_exists(live_name).await? {
            debug!(index = %live_name, "Live index already exists");
            return Ok(());
        }

        let generation = generation_index_name(live_name, chrono::Utc::now().timestamp_millis());
        self.create_index(
            &generation,
            get_index_settings(&self.index_config, Some(live_name)),
        )
        .await?;

        info!(index = %live_name, generation = %generation, "Created live index");
        Ok(())
    }

    /// Create the staging index if it does not exist yet.
    ///
    /// An existing staging index keeps its documents. A write block left on it by an
    /// interrupted promotion is cleared so later batches can still write.
    async fn ensure_staging_index(&self, staging_name: &str) -> Result<(), SearchIndexError> {
        if self.index_exists(staging_name).await? {
            if self.is_write_blocked(staging_name).await? {
                self.set_write_block(staging_name, false).await?;
                info!(index = %staging_name, "Cleared stale write block on staging index");
            }
            return Ok(());
        }

        self.create_index(staging_name, get_index_settings(&self.index_config, None))
            .await?;

        info!(index = %staging_name, "Created staging index");
        Ok(())
    }

    /// Upsert documents with one `_bulk` request and report per-document outcomes.
    async fn bulk_upsert_documents(
        &self,
        index_name: &str,
        documents: &[IndexableDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::empty());
        }

        let body = build_bulk_body(documents)?;

        let response = self
            .client
            .bulk(BulkParts::Index(index_name))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::bulk_index(e.to_string()))?;

        let response =
            Self::ensure_success(response, "Bulk upsert", SearchIndexError::bulk_index).await?;
        let body = response
            .json::<Value>()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        let summary = parse_bulk_response(&body)?;
        debug!(
            index = %index_name,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Bulk upsert completed"
        );
        Ok(summary)
    }

    async fn list_indices(&self, pattern: &str) -> Result<Vec<String>, SearchIndexError> {
        let response = self
            .client
            .cat()
            .indices(CatIndicesParts::Index(&[pattern]))
            .format("json")
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if response.status_code().as_u16() == 404 {
            return Ok(Vec::new());
        }

        let response =
            Self::ensure_success(response, "List indices", SearchIndexError::index).await?;
        let body = response
            .json::<Value>()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        Ok(parse_cat_indices(&body))
    }

    /// Promote a staging index by cloning it into a new generation and swapping the alias.
    ///
    /// On failure before the swap, the new generation is removed, the staging index is
    /// made writable again and the live alias is left untouched. Cleanup after the swap
    /// is best-effort: old generations, orphans of earlier interrupted runs, then staging.
    async fn promote(&self, staging_name: &str, live_name: &str) -> Result<(), SearchIndexError> {
        if !self.index_exists(staging_name).await? {
            return Err(SearchIndexError::promotion(format!(
                "Staging index {} does not exist",
                staging_name
            )));
        }

        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[staging_name]))
            .send()
            .await
            .map_err(|e| SearchIndexError::promotion(e.to_string()))?;
        Self::ensure_success(response, "Refresh", SearchIndexError::promotion).await?;

        let generation = generation_index_name(live_name, chrono::Utc::now().timestamp_millis());

        let swapped = match self.clone_into_generation(staging_name, &generation).await {
            Ok(()) => self.swap_alias(live_name, &generation).await,
            Err(e) => Err(e),
        };

        let previous = match swapped {
            Ok(previous) => previous,
            Err(e) => {
                if let Err(cleanup) = self.delete_index(&generation).await {
                    warn!(index = %generation, error = %cleanup, "Failed to remove unused generation");
                }
                self.release_staging(staging_name).await;
                return Err(e);
            }
        };

        for old in &previous {
            if let Err(e) = self.delete_index(old).await {
                warn!(index = %old, error = %e, "Failed to delete index after promotion");
            }
        }
        self.delete_orphan_generations(live_name, &generation).await;

        if let Err(e) = self.delete_index(staging_name).await {
            warn!(index = %staging_name, error = %e, "Failed to delete staging index after promotion");
            self.release_staging(staging_name).await;
        }

        info!(
            live = %live_name,
            generation = %generation,
            replaced = previous.len(),
            "Promoted staging index"
        );
        Ok(())
    }

    async fn search(
        &self,
        index_names: &[String],
        query: &SearchQuery,
    ) -> Result<SearchResponse, SearchIndexError> {
        let names: Vec<&str> = index_names.iter().map(String::as_str).collect();

        let response = self
            .client
            .search(SearchParts::Index(&names))
            .ignore_unavailable(true)
            .body(build_search_body(query))
            .send()
            .await
            .map_err(|e| SearchIndexError::search(e.to_string()))?;

        let response = Self::ensure_success(response, "Search", SearchIndexError::search).await?;
        let body = response
            .json::<Value>()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        parse_search_response(&body)
    }
}

/// Whether a flat `_settings` response marks `index` as write-blocked.
/// The cluster reports the flag as a string, older clients stored a bool.
fn parse_write_block(body: &Value, index: &str) -> bool {
    match body
        .get(index)
        .and_then(|entry| entry.get("settings"))
        .and_then(|settings| settings.get(WRITE_BLOCK_SETTING))
    {
        Some(Value::Bool(blocked)) => *blocked,
        Some(Value::String(flag)) => flag == "true",
        _ => false,
    }
}

/// Whether `name` is a generation index `{live}_g{digits}` of `live_name`.
fn is_generation_of(live_name: &str, name: &str) -> bool {
    name.strip_prefix(live_name)
        .and_then(|rest| rest.strip_prefix(GENERATION_SEPARATOR))
        .is_some_and(|stamp| !stamp.is_empty() && stamp.bytes().all(|b| b.is_ascii_digit()))
}

/// Build the newline-delimited bulk body: an action line followed by the document.
fn build_bulk_body(
    documents: &[IndexableDocument],
) -> Result<Vec<JsonBody<Value>>, SearchIndexError> {
    let mut body = Vec::with_capacity(documents.len() * 2);

    for doc in documents {
        let source =
            serde_json::to_value(doc).map_err(|e| SearchIndexError::serialization(e.to_string()))?;
        body.push(JsonBody::new(json!({ "index": { "_id": doc.object_id } })));
        body.push(JsonBody::new(source));
    }

    Ok(body)
}

/// Read per-item outcomes from a `_bulk` response.
fn parse_bulk_response(body: &Value) -> Result<BatchOperationSummary, SearchIndexError> {
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchIndexError::parse("Bulk response has no items"))?;

    let results = items
        .iter()
        .map(|item| {
            let outcome = item
                .as_object()
                .and_then(|actions| actions.values().next())
                .cloned()
                .unwrap_or(Value::Null);
            let object_id = outcome
                .get("_id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            match outcome.get("error") {
                Some(error) if !error.is_null() => {
                    let reason = error
                        .get("reason")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| error.to_string());
                    BatchOperationResult::failed(object_id, SearchIndexError::index(reason))
                }
                _ => BatchOperationResult::succeeded(object_id),
            }
        })
        .collect();

    Ok(BatchOperationSummary::from_results(results))
}

/// Build the query DSL for a delegated search.
fn build_search_body(query: &SearchQuery) -> Value {
    let filters: Vec<Value> = query
        .facet_filters
        .iter()
        .map(|(facet, value)| json!({ "term": { format!("facets.{}", facet): value } }))
        .collect();

    let mut sort = vec![json!("_score")];
    for ranking in &query.custom_ranking {
        let order = match ranking.order {
            RankingOrder::Asc => "asc",
            RankingOrder::Desc => "desc",
        };
        sort.push(json!({
            format!("ranking.{}", ranking.attribute): {
                "order": order,
                "unmapped_type": "double"
            }
        }));
    }

    json!({
        "query": {
            "bool": {
                "must": [{
                    "multi_match": {
                        "query": query.query,
                        "fields": ["searchable.*"],
                        "fuzziness": "AUTO"
                    }
                }],
                "filter": filters
            }
        },
        "sort": sort,
        "track_scores": true,
        "_source": ["item_type"],
        "from": query.offset,
        "size": query.limit
    })
}

/// Read ranked hits from a search response.
fn parse_search_response(body: &Value) -> Result<SearchResponse, SearchIndexError> {
    let hits = body
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchIndexError::parse("Search response has no hits"))?;

    let hits = hits
        .iter()
        .filter_map(|hit| {
            let object_id = hit.get("_id")?.as_str()?.to_string();
            let item_type = hit
                .pointer("/_source/item_type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let relevance_score = hit.get("_score").and_then(Value::as_f64).unwrap_or(0.0);
            Some(SearchHit {
                object_id,
                item_type,
                relevance_score,
            })
        })
        .collect();

    let total = body
        .pointer("/hits/total/value")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let took_ms = body.get("took").and_then(Value::as_u64).unwrap_or(0);

    Ok(SearchResponse::new(hits, total, took_ms))
}

/// Index names from a `_cat/indices?format=json` response.
fn parse_cat_indices(body: &Value) -> Vec<String> {
    body.as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|row| row.get("index").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Index names from a `GET _alias/{name}` response, which is keyed by index.
fn parse_alias_targets(body: &Value) -> Vec<String> {
    let mut targets: Vec<String> = body
        .as_object()
        .map(|indices| indices.keys().cloned().collect())
        .unwrap_or_default();
    targets.sort();
    targets
}

/// The `_aliases` body that attaches `generation` and detaches everything else.
fn build_alias_actions(
    live_name: &str,
    generation: &str,
    previous: &[String],
    remove_concrete_live: bool,
) -> Value {
    let mut actions = vec![json!({ "add": { "index": generation, "alias": live_name } })];

    for old in previous {
        actions.push(json!({ "remove": { "index": old, "alias": live_name } }));
    }
    if remove_concrete_live {
        actions.push(json!({ "remove_index": { "index": live_name } }));
    }

    let mut body = Map::new();
    body.insert("actions".to_string(), Value::Array(actions));
    Value::Object(body)
}

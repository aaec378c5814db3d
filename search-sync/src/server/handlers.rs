// HTTP request handlers
use std::collections::{BTreeMap, HashMap};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::dispatcher::ReindexPlan;
use crate::errors::SyncError;
use crate::server::state::AppState;
use search_sync_repository::SearchIndexError;
use search_sync_shared::{NativeQuery, SyncSettings};

/// Status code plus JSON body, as returned by every data handler.
pub type JsonResponse = (StatusCode, Json<Value>);

/// Query parameters with a fixed meaning; every other parameter is a facet filter.
const RESERVED_PARAMS: [&str; 4] = ["s", "type", "page", "per_page"];

/// Upper bound for `per_page`.
const MAX_PER_PAGE: usize = 100;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Search sync is running")
}

/// Control endpoint - receives a JSON array of control tokens and dispatches them
pub async fn reindex_handler(
    State(state): State<AppState>,
    Json(tokens): Json<Vec<String>>,
) -> JsonResponse {
    info!(message_count = tokens.len(), "Received control request");

    let report = state.dispatcher.dispatch(&tokens).await;
    (StatusCode::OK, Json(json!(report)))
}

/// Reindex plan endpoint - the token groups a client sends for a full reindex
pub async fn plan_handler(State(state): State<AppState>) -> JsonResponse {
    let settings = state.context.settings().await;

    let mut item_counts = BTreeMap::new();
    for item_type in settings.type_names() {
        match state.content.count_items(&item_type).await {
            Ok(count) => {
                item_counts.insert(item_type, count);
            }
            Err(e) => return backend_error(&SyncError::from(e)),
        }
    }

    let taxonomies = match state.content.list_taxonomies().await {
        Ok(taxonomies) => taxonomies,
        Err(e) => return backend_error(&SyncError::from(e)),
    };
    let mut term_counts = BTreeMap::new();
    for taxonomy in taxonomies {
        match state.content.count_terms(&taxonomy).await {
            Ok(count) => {
                term_counts.insert(taxonomy, count);
            }
            Err(e) => return backend_error(&SyncError::from(e)),
        }
    }

    let plan = ReindexPlan::build(
        &settings,
        item_counts,
        term_counts,
        state.context.reindex_state().await,
    );
    (StatusCode::OK, Json(json!(plan)))
}

/// Search endpoint - runs a native query, delegating search requests to the index
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> JsonResponse {
    let mut query = match native_query_from_params(params) {
        Ok(query) => query,
        Err(message) => return bad_request(message),
    };

    let settings = state.context.settings().await;
    let delegated = state.delegator.intercept_query(&settings, &mut query);

    let native_items = match state.native.execute(&settings, &query).await {
        Ok(items) => items,
        Err(e) => return backend_error(&e),
    };

    match state
        .delegator
        .reorder_results(&settings, &query, native_items)
        .await
    {
        Ok(results) => (
            StatusCode::OK,
            Json(json!({
                "delegated": delegated,
                "page": query.page,
                "per_page": query.per_page,
                "ranked_ids": results.ranked_ids,
                "dropped": results.dropped,
                "items": results.items,
            })),
        ),
        Err(e) => backend_error(&e),
    }
}

/// Settings export endpoint - current settings and reindex state
pub async fn export_settings_handler(State(state): State<AppState>) -> JsonResponse {
    (
        StatusCode::OK,
        Json(json!({
            "settings": state.context.settings().await,
            "state": state.context.reindex_state().await,
        })),
    )
}

/// Settings import endpoint - replaces the settings as a whole
pub async fn import_settings_handler(
    State(state): State<AppState>,
    Json(settings): Json<SyncSettings>,
) -> JsonResponse {
    match state.context.replace_settings(settings).await {
        Ok(shape_changed) => {
            info!(shape_changed, "Settings imported");
            settings_response(&state, shape_changed).await
        }
        Err(message) => bad_request(message),
    }
}

/// Settings reset endpoint - restores defaults, keeps the index prefix
pub async fn reset_settings_handler(State(state): State<AppState>) -> JsonResponse {
    let current = state.context.settings().await;
    let defaults = SyncSettings {
        index_prefix: current.index_prefix,
        ..SyncSettings::default()
    };

    match state.context.replace_settings(defaults).await {
        Ok(shape_changed) => {
            state.context.set_needs_reindex(true).await;
            info!("Settings reset to defaults");
            settings_response(&state, shape_changed).await
        }
        Err(message) => {
            error!(error = %message, "Default settings rejected");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": message })),
            )
        }
    }
}

async fn settings_response(state: &AppState, shape_changed: bool) -> JsonResponse {
    let reindex = state.context.reindex_state().await;
    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "index_shape_changed": shape_changed,
            "needs_reindex": reindex.needs_reindex,
            "settings": state.context.settings().await,
        })),
    )
}

/// Build a native query from `s`, `type`, `page`, `per_page` and facet parameters.
///
/// `type` takes a comma separated list.
pub fn native_query_from_params(mut params: HashMap<String, String>) -> Result<NativeQuery, String> {
    let page = take_number(&mut params, "page")?.unwrap_or(1);
    let per_page = take_number(&mut params, "per_page")?
        .unwrap_or(NativeQuery::default().per_page);
    if per_page == 0 || per_page > MAX_PER_PAGE {
        return Err(format!("per_page must be between 1 and {}", MAX_PER_PAGE));
    }

    let mut query = NativeQuery::default().with_page(page, per_page);
    query.search_term = params.remove("s");
    if let Some(types) = params.remove("type") {
        query.item_types = types
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
    }

    query.facet_filters = params
        .into_iter()
        .filter(|(name, _)| !RESERVED_PARAMS.contains(&name.as_str()))
        .collect();

    Ok(query)
}

fn take_number(params: &mut HashMap<String, String>, name: &str) -> Result<Option<usize>, String> {
    params
        .remove(name)
        .map(|raw| {
            raw.trim()
                .parse::<usize>()
                .map_err(|_| format!("{} must be a non-negative integer, got '{}'", name, raw))
        })
        .transpose()
}

fn bad_request(message: String) -> JsonResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "status": "error", "message": message })),
    )
}

fn backend_error(e: &SyncError) -> JsonResponse {
    error!(error = %e, "Request failed");
    let status = match e {
        SyncError::ValidationError(_)
        | SyncError::SearchIndexError(SearchIndexError::ValidationError(_)) => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(json!({ "status": "error", "message": e.to_string() })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_native_query_from_params() {
        let query = native_query_from_params(params(&[
            ("s", "red shoes"),
            ("type", "product, post"),
            ("page", "3"),
            ("per_page", "20"),
            ("brand", "acme"),
        ]))
        .unwrap();

        assert_eq!(query.search_term.as_deref(), Some("red shoes"));
        assert_eq!(query.item_types, vec!["product", "post"]);
        assert_eq!(query.page, 3);
        assert_eq!(query.per_page, 20);
        assert_eq!(query.facet_filters.get("brand").map(String::as_str), Some("acme"));
        assert_eq!(query.facet_filters.len(), 1);
    }

    #[test]
    fn test_native_query_defaults() {
        let query = native_query_from_params(HashMap::new()).unwrap();

        assert_eq!(query, NativeQuery::default());
        assert!(!query.is_search_request());
    }

    #[test]
    fn test_native_query_rejects_bad_paging() {
        assert!(native_query_from_params(params(&[("page", "two")])).is_err());
        assert!(native_query_from_params(params(&[("per_page", "0")])).is_err());
        assert!(native_query_from_params(params(&[("per_page", "1000")])).is_err());
        assert!(native_query_from_params(params(&[("per_page", "-1")])).is_err());
    }

    #[test]
    fn test_backend_error_status() {
        let (status, _) = backend_error(&SyncError::validation("bad query"));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = backend_error(&SyncError::loader("down"));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.0["status"], "error");
    }
}

//! Query delegation and re-ranking against the in-memory backend.

mod common;

use common::{post, settings, tokens, Harness, MemoryContent};
use search_sync::SyncError;
use search_sync_shared::{ContentItem, DelegationStrategy, NativeQuery, SyncSettings};

fn ids(items: &[ContentItem]) -> Vec<u64> {
    items.iter().map(|item| item.id).collect()
}

fn intersect(mut settings: SyncSettings) -> SyncSettings {
    settings.delegation = DelegationStrategy::Intersect;
    settings
}

#[tokio::test]
async fn test_deleted_items_are_dropped_from_ranking() {
    let content = MemoryContent::new(vec![
        post(3, "Running shoes"),
        post(7, "Trail shoes"),
        post(9, "Old shoes"),
    ]);
    content.delete(9);
    let harness = Harness::new(settings(10, &["post"]), content);
    harness.index.script_ranking(&["7", "3", "9"]);

    let settings = harness.deps.context.settings().await;
    let mut query = NativeQuery::search("shoes");

    assert!(harness.deps.delegator.intercept_query(&settings, &mut query));
    let native = harness.deps.native.execute(&settings, &query).await.unwrap();
    assert!(native.is_empty());

    let results = harness
        .deps
        .delegator
        .reorder_results(&settings, &query, native)
        .await
        .unwrap();

    assert_eq!(ids(&results.items), vec![7, 3]);
    assert_eq!(results.ranked_ids, vec![7, 3, 9]);
    assert_eq!(results.dropped, 1);
}

#[tokio::test]
async fn test_replace_strategy_suppresses_native_query() {
    let harness = Harness::new(settings(10, &["post"]), MemoryContent::default());
    let settings = harness.deps.context.settings().await;

    let mut query = NativeQuery::search("shoes").with_facet("author", "ada");
    assert!(harness.deps.delegator.intercept_query(&settings, &mut query));

    assert!(query.suppress_native);
    assert!(query.search_term.is_none());
    let delegated = query.delegated.clone().unwrap();
    assert_eq!(delegated.term, "shoes");
    assert_eq!(
        delegated.facet_filters.get("author").map(String::as_str),
        Some("ada")
    );

    // A second interception leaves the marker alone
    let before = query.clone();
    assert!(harness.deps.delegator.intercept_query(&settings, &mut query));
    assert_eq!(query, before);
}

#[tokio::test]
async fn test_non_search_queries_pass_through() {
    let content = MemoryContent::new(vec![post(2, "B"), post(1, "A"), post(3, "C")]);
    let harness = Harness::new(settings(10, &["post"]), content);
    harness.index.script_ranking(&["3"]);
    let settings = harness.deps.context.settings().await;

    let mut query = NativeQuery::default().for_type("post");
    assert!(!harness.deps.delegator.intercept_query(&settings, &mut query));
    assert!(!query.suppress_native);

    let native = harness.deps.native.execute(&settings, &query).await.unwrap();
    let results = harness
        .deps
        .delegator
        .reorder_results(&settings, &query, native)
        .await
        .unwrap();

    assert_eq!(ids(&results.items), vec![1, 2, 3]);
    assert!(results.ranked_ids.is_empty());
}

#[tokio::test]
async fn test_intersect_keeps_only_ranked_native_items() {
    let content = MemoryContent::new((1..=4).map(|id| post(id, &format!("Shoes {}", id))).collect());
    let harness = Harness::new(intersect(settings(10, &["post"])), content);
    harness.index.script_ranking(&["4", "2", "9"]);
    let settings = harness.deps.context.settings().await;

    let mut query = NativeQuery::search("shoes");
    assert!(harness.deps.delegator.intercept_query(&settings, &mut query));
    assert!(!query.suppress_native);
    assert_eq!(query.search_term.as_deref(), Some("shoes"));

    let native = harness.deps.native.execute(&settings, &query).await.unwrap();
    assert_eq!(ids(&native), vec![1, 2, 3, 4]);
    let reads_before = harness.content.reads();

    let results = harness
        .deps
        .delegator
        .reorder_results(&settings, &query, native)
        .await
        .unwrap();

    assert_eq!(ids(&results.items), vec![4, 2]);
    assert_eq!(results.dropped, 1);
    assert_eq!(harness.content.reads(), reads_before);
}

#[tokio::test]
async fn test_duplicate_ranked_ids_are_emitted_once() {
    let content = MemoryContent::new(vec![post(1, "Shoes"), post(3, "Boots")]);
    let harness = Harness::new(settings(10, &["post"]), content);
    harness.index.script_ranking(&["3", "3", "not-an-id", "1", "3"]);
    let settings = harness.deps.context.settings().await;

    let mut query = NativeQuery::search("shoes");
    harness.deps.delegator.intercept_query(&settings, &mut query);
    let results = harness
        .deps
        .delegator
        .reorder_results(&settings, &query, Vec::new())
        .await
        .unwrap();

    assert_eq!(ids(&results.items), vec![3, 1]);
    assert_eq!(results.ranked_ids, vec![3, 1]);
    assert_eq!(results.dropped, 0);
}

#[tokio::test]
async fn test_search_over_promoted_index() {
    let content = MemoryContent::new(vec![
        post(1, "Red shoes"),
        post(2, "Blue boots"),
        post(3, "Green shoes"),
    ]);
    let harness = Harness::new(settings(10, &["post"]), content);
    harness
        .deps
        .dispatcher
        .dispatch(&tokens(&["handle_index_creation", "type__post__0", "move_indexes"]))
        .await;

    let settings = harness.deps.context.settings().await;
    let mut query = NativeQuery::search("SHOES");
    harness.deps.delegator.intercept_query(&settings, &mut query);
    let native = harness.deps.native.execute(&settings, &query).await.unwrap();
    let results = harness
        .deps
        .delegator
        .reorder_results(&settings, &query, native)
        .await
        .unwrap();

    assert_eq!(ids(&results.items), vec![1, 3]);
}

#[tokio::test]
async fn test_backend_failure_surfaces_as_error() {
    let harness = Harness::new(settings(10, &["post"]), MemoryContent::default());
    harness.index.fail_search();
    let settings = harness.deps.context.settings().await;

    let mut query = NativeQuery::search("shoes");
    harness.deps.delegator.intercept_query(&settings, &mut query);
    let result = harness
        .deps
        .delegator
        .reorder_results(&settings, &query, Vec::new())
        .await;

    assert!(matches!(result, Err(SyncError::SearchIndexError(_))));
}

#[tokio::test]
async fn test_intersect_drops_ranked_items_outside_the_native_page() {
    let content = MemoryContent::new((1..=4).map(|id| post(id, &format!("Shoes {}", id))).collect());
    let harness = Harness::new(intersect(settings(10, &["post"])), content);
    harness.index.script_ranking(&["3", "1"]);
    let settings = harness.deps.context.settings().await;

    let mut query = NativeQuery::search("shoes").with_page(1, 2);
    harness.deps.delegator.intercept_query(&settings, &mut query);
    let native = harness.deps.native.execute(&settings, &query).await.unwrap();
    assert_eq!(ids(&native), vec![1, 2]);

    let results = harness
        .deps
        .delegator
        .reorder_results(&settings, &query, native)
        .await
        .unwrap();

    assert_eq!(ids(&results.items), vec![1]);
    assert_eq!(results.dropped, 1);
}

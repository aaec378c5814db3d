//! Integration tests for the PostgreSQL content repository.
//!
//! These tests require a real PostgreSQL database and use SQLx test macros
//! to ensure proper test isolation and cleanup.
//!
//! Run with: `cargo test --test postgres_content`

use search_sync_repository::{ContentRepository, PostgresContentRepository};

async fn seed(pool: &sqlx::PgPool) {
    sqlx::query(
        r#"
        INSERT INTO content_items (id, item_type, status, title, body, author, attributes)
        VALUES
            (1, 'post', 'publish', 'First', 'one', 'ana', '{"price": 10}'),
            (2, 'post', 'draft', 'Second', 'two', NULL, '{}'),
            (3, 'post', 'publish', 'Third', 'three', NULL, '{}'),
            (4, 'page', 'publish', 'About', 'about us', NULL, '{}'),
            (5, 'post', 'publish', 'Fifth', 'five', NULL, '{}')
        "#,
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        r#"
        INSERT INTO taxonomy_terms (term_id, taxonomy, name, slug, item_count)
        VALUES
            (1, 'category', 'News', 'news', 2),
            (2, 'category', 'Empty', 'empty', 0),
            (1, 'post_tag', 'Rust', 'rust', 1)
        "#,
    )
    .execute(pool)
    .await
    .unwrap();
}

// ============================================================================
// Content items
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_list_items_pages_published_by_id(pool: sqlx::PgPool) {
    seed(&pool).await;
    let repository = PostgresContentRepository::new(pool).await.unwrap();

    let first = repository.list_items("post", 0, 2).await.unwrap();
    let second = repository.list_items("post", 2, 2).await.unwrap();

    assert_eq!(first.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(second.iter().map(|i| i.id).collect::<Vec<_>>(), vec![5]);
    assert_eq!(first[0].author.as_deref(), Some("ana"));
    assert_eq!(first[0].attributes["price"], 10);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_list_items_past_end_is_empty(pool: sqlx::PgPool) {
    seed(&pool).await;
    let repository = PostgresContentRepository::new(pool).await.unwrap();

    assert!(repository.list_items("post", 100, 10).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_count_items_ignores_drafts(pool: sqlx::PgPool) {
    seed(&pool).await;
    let repository = PostgresContentRepository::new(pool).await.unwrap();

    assert_eq!(repository.count_items("post").await.unwrap(), 3);
    assert_eq!(repository.count_items("page").await.unwrap(), 1);
    assert_eq!(repository.count_items("product").await.unwrap(), 0);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_get_items_skips_missing_and_unpublished(pool: sqlx::PgPool) {
    seed(&pool).await;
    let repository = PostgresContentRepository::new(pool).await.unwrap();

    let mut ids: Vec<u64> = repository
        .get_items(&[4, 2, 99, 1])
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.id)
        .collect();
    ids.sort();

    assert_eq!(ids, vec![1, 4]);
    assert!(repository.get_item(2).await.unwrap().is_none());
    assert_eq!(repository.get_item(4).await.unwrap().unwrap().title, "About");
}

// ============================================================================
// Taxonomy terms
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_taxonomies_and_terms(pool: sqlx::PgPool) {
    seed(&pool).await;
    let repository = PostgresContentRepository::new(pool).await.unwrap();

    assert_eq!(
        repository.list_taxonomies().await.unwrap(),
        vec!["category".to_string(), "post_tag".to_string()]
    );

    let terms = repository.list_terms("category").await.unwrap();
    assert_eq!(terms.len(), 2);
    assert_eq!(terms[1].slug, "empty");
    assert_eq!(terms[1].item_count, 0);
    assert_eq!(repository.count_terms("post_tag").await.unwrap(), 1);
}

//! PostgreSQL-backed content repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use search_sync_shared::{ContentItem, TaxonomyTerm};
use serde_json::{Map, Value};
use sqlx::types::Json;

use crate::errors::ContentRepositoryError;
use crate::interfaces::ContentRepository;

/// Only items in this status are visible to the sync.
const PUBLISHED: &str = "publish";

const ITEM_COLUMNS: &str =
    "id, item_type, title, body, excerpt, author, published_at, attributes";

#[derive(sqlx::FromRow)]
struct ContentItemRow {
    id: i64,
    item_type: String,
    title: String,
    body: String,
    excerpt: Option<String>,
    author: Option<String>,
    published_at: Option<DateTime<Utc>>,
    attributes: Json<Map<String, Value>>,
}

impl TryFrom<ContentItemRow> for ContentItem {
    type Error = ContentRepositoryError;

    fn try_from(row: ContentItemRow) -> Result<Self, Self::Error> {
        let id = u64::try_from(row.id).map_err(|_| {
            ContentRepositoryError::decode(format!("Negative content item id {}", row.id))
        })?;

        Ok(ContentItem {
            id,
            item_type: row.item_type,
            title: row.title,
            body: row.body,
            excerpt: row.excerpt,
            author: row.author,
            published_at: row.published_at,
            attributes: row.attributes.0,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TaxonomyTermRow {
    term_id: i64,
    taxonomy: String,
    name: String,
    slug: String,
    item_count: i64,
}

impl TryFrom<TaxonomyTermRow> for TaxonomyTerm {
    type Error = ContentRepositoryError;

    fn try_from(row: TaxonomyTermRow) -> Result<Self, Self::Error> {
        let term_id = u64::try_from(row.term_id).map_err(|_| {
            ContentRepositoryError::decode(format!("Negative term id {}", row.term_id))
        })?;

        Ok(TaxonomyTerm {
            term_id,
            taxonomy: row.taxonomy,
            name: row.name,
            slug: row.slug,
            item_count: u64::try_from(row.item_count).unwrap_or(0),
        })
    }
}

fn to_i64(value: usize, what: &str) -> Result<i64, ContentRepositoryError> {
    i64::try_from(value)
        .map_err(|_| ContentRepositoryError::query(format!("{} {} is out of range", what, value)))
}

/// PostgreSQL-backed content repository.
///
/// Reads published rows of `content_items` and every row of `taxonomy_terms`.
/// The repository never writes.
pub struct PostgresContentRepository {
    /// PostgreSQL connection pool
    pool: sqlx::PgPool,
}

impl PostgresContentRepository {
    /// Creates a new content repository over an existing pool.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool with the content schema
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, ContentRepositoryError> {
        Ok(Self { pool })
    }

    /// Connects to `url` and creates a repository over the new pool.
    pub async fn connect(url: &str) -> Result<Self, ContentRepositoryError> {
        let pool = sqlx::PgPool::connect(url)
            .await
            .map_err(|e| ContentRepositoryError::connection(e.to_string()))?;
        Self::new(pool).await
    }
}

#[async_trait]
impl ContentRepository for PostgresContentRepository {
    async fn list_items(
        &self,
        item_type: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ContentItem>, ContentRepositoryError> {
        let sql = format!(
            "SELECT {} FROM content_items WHERE item_type = $1 AND status = $2 ORDER BY id ASC OFFSET $3 LIMIT $4",
            ITEM_COLUMNS
        );

        let rows: Vec<ContentItemRow> = sqlx::query_as(&sql)
            .bind(item_type)
            .bind(PUBLISHED)
            .bind(to_i64(offset, "offset")?)
            .bind(to_i64(limit, "limit")?)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ContentItem::try_from).collect()
    }

    async fn get_item(&self, id: u64) -> Result<Option<ContentItem>, ContentRepositoryError> {
        let Ok(id) = i64::try_from(id) else {
            return Ok(None);
        };

        let sql = format!(
            "SELECT {} FROM content_items WHERE id = $1 AND status = $2",
            ITEM_COLUMNS
        );

        let row: Option<ContentItemRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(PUBLISHED)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ContentItem::try_from).transpose()
    }

    async fn get_items(&self, ids: &[u64]) -> Result<Vec<ContentItem>, ContentRepositoryError> {
        let ids: Vec<i64> = ids.iter().filter_map(|id| i64::try_from(*id).ok()).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM content_items WHERE id = ANY($1) AND status = $2",
            ITEM_COLUMNS
        );

        let rows: Vec<ContentItemRow> = sqlx::query_as(&sql)
            .bind(&ids)
            .bind(PUBLISHED)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ContentItem::try_from).collect()
    }

    async fn count_items(&self, item_type: &str) -> Result<u64, ContentRepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM content_items WHERE item_type = $1 AND status = $2",
        )
        .bind(item_type)
        .bind(PUBLISHED)
        .fetch_one(&self.pool)
        .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn list_taxonomies(&self) -> Result<Vec<String>, ContentRepositoryError> {
        let taxonomies: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT taxonomy FROM taxonomy_terms ORDER BY taxonomy")
                .fetch_all(&self.pool)
                .await?;

        Ok(taxonomies)
    }

    async fn list_terms(&self, taxonomy: &str) -> Result<Vec<TaxonomyTerm>, ContentRepositoryError> {
        let rows: Vec<TaxonomyTermRow> = sqlx::query_as(
            "SELECT term_id, taxonomy, name, slug, item_count FROM taxonomy_terms WHERE taxonomy = $1 ORDER BY term_id ASC",
        )
        .bind(taxonomy)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TaxonomyTerm::try_from).collect()
    }

    async fn count_terms(&self, taxonomy: &str) -> Result<u64, ContentRepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM taxonomy_terms WHERE taxonomy = $1")
            .bind(taxonomy)
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}

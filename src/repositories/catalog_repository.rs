use crate::models::{CatalogItem, NewCatalogItem};
use async_trait::async_trait;
use crate::db::DbConnection;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),
}

impl RepositoryError {
    /// Splits store-side constraint failures (check, foreign key, unique, not
    /// null) from connection and protocol errors.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_check_violation()
                || db_err.is_foreign_key_violation()
                || db_err.is_unique_violation()
                || db_err.code().as_deref() == Some("23502")
            {
                return RepositoryError::ConstraintViolation(db_err.message().to_string());
            }
        }
        RepositoryError::Database(err)
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn count_items(&self) -> RepositoryResult<i64>;
    async fn insert_item(&self, item: &NewCatalogItem) -> RepositoryResult<CatalogItem>;
    async fn list_items(&self, limit: i64) -> RepositoryResult<Vec<CatalogItem>>;
}

pub struct PgCatalogRepository {
    conn: DbConnection,
}

impl PgCatalogRepository {
    pub fn new(conn: DbConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn count_items(&self) -> RepositoryResult<i64> {
        let mut conn = self.conn.lock().await?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM public.items")
            .fetch_one(&mut *conn)
            .await?;

        Ok(count)
    }

    async fn insert_item(&self, item: &NewCatalogItem) -> RepositoryResult<CatalogItem> {
        let mut conn = self.conn.lock().await?;
        sqlx::query_as::<_, CatalogItem>(
            r#"
            INSERT INTO public.items (name, description, price, category, image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, price, category, image_url, created_at
            "#,
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(&item.category)
        .bind(&item.image_url)
        .fetch_one(&mut *conn)
        .await
        .map_err(RepositoryError::from_sqlx)
    }

    async fn list_items(&self, limit: i64) -> RepositoryResult<Vec<CatalogItem>> {
        let mut conn = self.conn.lock().await?;
        let items = sqlx::query_as::<_, CatalogItem>(
            r#"
            SELECT id, name, description, price, category, image_url, created_at
            FROM public.items
            ORDER BY created_at ASC, name ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

        Ok(items)
    }
}

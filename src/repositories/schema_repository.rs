use super::catalog_repository::{RepositoryError, RepositoryResult};
use crate::schema::{SchemaStatement, TABLES, TRIGGER_NAME};
use async_trait::async_trait;
use crate::db::DbConnection;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaRepository: Send + Sync {
    /// Runs one statement over the simple query protocol, so `DO` blocks and
    /// dollar-quoted function bodies pass through untouched.
    async fn execute(&self, statement: &SchemaStatement) -> RepositoryResult<()>;
    /// Storefront tables present in `public`.
    async fn existing_tables(&self) -> RepositoryResult<Vec<String>>;
    /// Storefront tables with row-level security switched on.
    async fn rls_enabled_tables(&self) -> RepositoryResult<Vec<String>>;
    /// `(table, policy)` pairs defined on `public` tables.
    async fn existing_policies(&self) -> RepositoryResult<Vec<(String, String)>>;
    /// How many profile-creation triggers are attached to `auth.users`.
    async fn trigger_count(&self) -> RepositoryResult<i64>;
}

pub struct PgSchemaRepository {
    conn: DbConnection,
}

impl PgSchemaRepository {
    pub fn new(conn: DbConnection) -> Self {
        Self { conn }
    }
}

fn table_names() -> Vec<String> {
    TABLES.iter().map(|table| table.to_string()).collect()
}

#[async_trait]
impl SchemaRepository for PgSchemaRepository {
    async fn execute(&self, statement: &SchemaStatement) -> RepositoryResult<()> {
        let mut conn = self.conn.lock().await?;
        sqlx::Executor::execute(&mut *conn, sqlx::raw_sql(&statement.sql))
            .await
            .map_err(RepositoryError::from_sqlx)?;

        Ok(())
    }

    async fn existing_tables(&self) -> RepositoryResult<Vec<String>> {
        let mut conn = self.conn.lock().await?;
        let tables: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT table_name::text
            FROM information_schema.tables
            WHERE table_schema = 'public' AND table_name = ANY($1)
            ORDER BY table_name
            "#,
        )
        .bind(table_names())
        .fetch_all(&mut *conn)
        .await?;

        Ok(tables)
    }

    async fn rls_enabled_tables(&self) -> RepositoryResult<Vec<String>> {
        let mut conn = self.conn.lock().await?;
        let tables: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT c.relname::text
            FROM pg_class c
            JOIN pg_namespace n ON n.oid = c.relnamespace
            WHERE n.nspname = 'public'
              AND c.relkind = 'r'
              AND c.relrowsecurity
              AND c.relname = ANY($1)
            ORDER BY c.relname
            "#,
        )
        .bind(table_names())
        .fetch_all(&mut *conn)
        .await?;

        Ok(tables)
    }

    async fn existing_policies(&self) -> RepositoryResult<Vec<(String, String)>> {
        let mut conn = self.conn.lock().await?;
        let policies: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT tablename::text, policyname::text
            FROM pg_policies
            WHERE schemaname = 'public'
            ORDER BY tablename, policyname
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(policies)
    }

    async fn trigger_count(&self) -> RepositoryResult<i64> {
        let mut conn = self.conn.lock().await?;
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM pg_trigger t
            JOIN pg_class c ON c.oid = t.tgrelid
            JOIN pg_namespace n ON n.oid = c.relnamespace
            WHERE n.nspname = 'auth' AND c.relname = 'users' AND t.tgname = $1
            "#,
        )
        .bind(TRIGGER_NAME)
        .fetch_one(&mut *conn)
        .await?;

        Ok(count)
    }
}

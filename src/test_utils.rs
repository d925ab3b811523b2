pub mod test_helpers {
    use crate::config::DatabaseConfig;
    use crate::db::DbConnection;
    use crate::repositories::PgSchemaRepository;
    use crate::services::SchemaService;
    use std::{collections::HashMap, env, sync::Arc};
    use uuid::Uuid;

    /// Sets and clears process environment variables for one test and puts
    /// every touched key back to its prior value on drop. Pair with `#[serial]`.
    #[derive(Default)]
    pub struct ScopedEnv {
        saved: HashMap<String, Option<String>>,
    }

    impl ScopedEnv {
        /// Starts with each of `keys` unset.
        pub fn cleared(keys: &[&str]) -> Self {
            let mut env = Self::default();
            for key in keys {
                env.unset(key);
            }
            env
        }

        fn remember(&mut self, key: &str) {
            if !self.saved.contains_key(key) {
                self.saved.insert(key.to_string(), env::var(key).ok());
            }
        }

        pub fn set(&mut self, key: &str, value: impl Into<String>) {
            self.remember(key);
            env::set_var(key, value.into());
        }

        pub fn unset(&mut self, key: &str) {
            self.remember(key);
            env::remove_var(key);
        }
    }

    impl Drop for ScopedEnv {
        fn drop(&mut self) {
            for (key, previous) in self.saved.drain() {
                if let Some(value) = previous {
                    env::set_var(&key, value);
                } else {
                    env::remove_var(&key);
                }
            }
        }
    }

    /// Connection string for database-backed tests. It must point at a
    /// disposable plain Postgres database: the helpers below drop the `auth`
    /// schema and the storefront tables.
    pub fn test_database_url() -> Option<String> {
        std::env::var("TEST_DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
    }

    pub fn test_config() -> Option<DatabaseConfig> {
        test_database_url().map(DatabaseConfig::Url)
    }

    /// Connect to the test database, or `None` when `TEST_DATABASE_URL` is unset.
    pub async fn create_test_db() -> anyhow::Result<Option<DbConnection>> {
        let Some(config) = test_config() else {
            return Ok(None);
        };

        Ok(Some(DbConnection::connect(&config).await?))
    }

    /// Drop everything the bootstrap and the auth shim create.
    pub async fn reset_database(conn: &DbConnection) -> Result<(), sqlx::Error> {
        let mut conn = conn.lock().await?;
        for statement in [
            "DROP TABLE IF EXISTS public.pawn_requests CASCADE",
            "DROP TABLE IF EXISTS public.items CASCADE",
            "DROP TABLE IF EXISTS public.profiles CASCADE",
            "DROP SCHEMA IF EXISTS auth CASCADE",
            "DROP FUNCTION IF EXISTS public.handle_new_user() CASCADE",
        ] {
            sqlx::raw_sql(statement).execute(&mut *conn).await?;
        }

        Ok(())
    }

    /// A clean database with the auth shim and the storefront schema applied.
    pub async fn create_bootstrapped_db() -> anyhow::Result<Option<DbConnection>> {
        let Some(conn) = create_test_db().await? else {
            return Ok(None);
        };
        reset_database(&conn).await?;

        let service = SchemaService::new(Arc::new(PgSchemaRepository::new(conn.clone())));
        service.apply_auth_shim().await?;
        service.apply_bootstrap().await?;

        Ok(Some(conn))
    }

    /// Register an identity in the shim's `auth.users`, which fires the
    /// profile trigger.
    pub async fn insert_auth_user(
        conn: &DbConnection,
        email: &str,
        full_name: Option<&str>,
    ) -> Result<Uuid, sqlx::Error> {
        let metadata = match full_name {
            Some(name) => serde_json::json!({ "full_name": name }),
            None => serde_json::json!({}),
        };

        let mut conn = conn.lock().await?;
        sqlx::query_scalar(
            "INSERT INTO auth.users (email, raw_user_meta_data) VALUES ($1, $2) RETURNING id",
        )
        .bind(email)
        .bind(metadata)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn count_rows(conn: &DbConnection, table: &str) -> Result<i64, sqlx::Error> {
        let mut conn = conn.lock().await?;
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&mut *conn)
            .await
    }
}

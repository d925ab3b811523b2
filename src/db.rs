use crate::config::DatabaseConfig;
use crate::error::AppError;
use sqlx::{Connection, PgConnection};
use std::{future::Future, sync::Arc};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

/// The single store connection a bootstrap run uses, shared by the
/// repositories. Statements issued through it are strictly sequential.
///
/// Once closed, every clone reports `sqlx::Error::PoolClosed`.
#[derive(Clone)]
pub struct DbConnection {
    inner: Arc<Mutex<Option<PgConnection>>>,
}

impl std::fmt::Debug for DbConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConnection").finish_non_exhaustive()
    }
}

impl DbConnection {
    pub fn new(conn: PgConnection) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(conn))),
        }
    }

    /// Makes exactly one connection attempt. A refused or rejected connection
    /// is returned as is; nothing is retried.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let options = config.connect_options()?;

        let conn = PgConnection::connect_with(&options)
            .await
            .map_err(AppError::Connection)?;

        Ok(Self::new(conn))
    }

    /// Exclusive access to the underlying connection for one statement.
    pub async fn lock(&self) -> Result<MappedMutexGuard<'_, PgConnection>, sqlx::Error> {
        let guard = self.inner.lock().await;
        MutexGuard::try_map(guard, |conn| conn.as_mut()).map_err(|_| sqlx::Error::PoolClosed)
    }

    /// Sends the terminate message and drops the connection. Closing twice is a no-op.
    pub async fn close(&self) -> Result<(), sqlx::Error> {
        let conn = self.inner.lock().await.take();
        match conn {
            Some(conn) => conn.close().await,
            None => Ok(()),
        }
    }

    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.is_none()
    }
}

/// Runs `op` against a freshly opened connection and closes it afterwards,
/// whether `op` succeeded or not. The result of `op` is returned unchanged.
pub async fn with_connection<T, F, Fut>(config: &DatabaseConfig, op: F) -> Result<T, AppError>
where
    F: FnOnce(DbConnection) -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let conn = DbConnection::connect(config).await?;
    tracing::debug!("Connected to {}", config.describe());

    let result = op(conn.clone()).await;

    if let Err(e) = conn.close().await {
        tracing::warn!("Closing connection to {} failed: {}", config.describe(), e);
    } else {
        tracing::debug!("Connection to {} closed", config.describe());
    }

    result
}

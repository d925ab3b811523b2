use super::schema_service::SchemaService;
use super::seed_service::{SeedPolicy, SeedReport, SeedService};
use crate::config::DatabaseConfig;
use crate::db::{self, DbConnection};
use crate::error::Result;
use crate::models::NewCatalogItem;
use crate::repositories::{
    CatalogRepository, PgCatalogRepository, PgSchemaRepository, SchemaRepository,
};
use std::sync::Arc;
use tracing::info;

/// Which steps of "ensure baseline state" to run. Steps always run in the
/// order auth shim, schema, seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BootstrapPlan {
    pub auth_shim: bool,
    pub schema: bool,
    pub seed: Option<SeedPolicy>,
}

impl BootstrapPlan {
    pub fn schema_only() -> Self {
        Self {
            schema: true,
            ..Self::default()
        }
    }

    pub fn seed_only(policy: SeedPolicy) -> Self {
        Self {
            seed: Some(policy),
            ..Self::default()
        }
    }

    pub fn full(policy: SeedPolicy) -> Self {
        Self {
            auth_shim: false,
            schema: true,
            seed: Some(policy),
        }
    }

    pub fn with_auth_shim(mut self, enabled: bool) -> Self {
        self.auth_shim = enabled;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub shim_statements: usize,
    pub schema_statements: usize,
    pub seed: Option<SeedReport>,
}

pub struct BootstrapService {
    schema_service: SchemaService,
    seed_service: SeedService,
}

impl BootstrapService {
    pub fn new(
        schema_repository: Arc<dyn SchemaRepository>,
        catalog_repository: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self {
            schema_service: SchemaService::new(schema_repository),
            seed_service: SeedService::new(catalog_repository),
        }
    }

    /// Both repositories share `conn`, so every statement of a run goes over
    /// the same session.
    pub fn from_connection(conn: DbConnection) -> Self {
        Self::new(
            Arc::new(PgSchemaRepository::new(conn.clone())),
            Arc::new(PgCatalogRepository::new(conn)),
        )
    }

    pub fn schema_service(&self) -> &SchemaService {
        &self.schema_service
    }

    pub fn seed_service(&self) -> &SeedService {
        &self.seed_service
    }

    /// Brings the store to the baseline state described by `plan`. The first
    /// failing step ends the run.
    pub async fn ensure_baseline(
        &self,
        plan: BootstrapPlan,
        items: &[NewCatalogItem],
    ) -> Result<BootstrapReport> {
        let mut report = BootstrapReport::default();

        if plan.auth_shim {
            info!("Applying auth shim");
            report.shim_statements = self.schema_service.apply_auth_shim().await?;
        }

        if plan.schema {
            info!("Applying storefront schema");
            report.schema_statements = self.schema_service.apply_bootstrap().await?;
        }

        if let Some(policy) = plan.seed {
            info!("Seeding catalog ({} policy, {} items)", policy, items.len());
            report.seed = Some(self.seed_service.seed(items, policy).await?);
        }

        Ok(report)
    }
}

/// Connects, runs `plan`, and releases the connection on every path.
pub async fn run(
    config: &DatabaseConfig,
    plan: BootstrapPlan,
    items: &[NewCatalogItem],
) -> Result<BootstrapReport> {
    db::with_connection(config, |conn| async move {
        BootstrapService::from_connection(conn)
            .ensure_baseline(plan, items)
            .await
    })
    .await
}

use crate::models::NewCatalogItem;
use crate::repositories::{CatalogRepository, RepositoryError};
use std::{fmt, sync::Arc};
use tracing::{error, info, warn};

/// How the seeder treats a catalog that already has rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SeedPolicy {
    /// Insert only when the catalog is empty; otherwise skip entirely.
    #[default]
    Guarded,
    /// Always insert, logging and skipping items that fail. Re-runs duplicate rows.
    Append,
}

impl fmt::Display for SeedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedPolicy::Guarded => f.write_str("guarded"),
            SeedPolicy::Append => f.write_str("append"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeedServiceError {
    #[error("Could not count catalog items: {0}")]
    CountFailed(#[source] RepositoryError),
    #[error("Inserting '{item}' failed after {inserted} item(s) were inserted: {source}")]
    InsertFailed {
        item: String,
        inserted: usize,
        #[source]
        source: RepositoryError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedInsert {
    pub item: String,
    pub error: String,
}

/// Overall result of a seed run, as shown to an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Guarded run found existing rows and inserted nothing.
    Skipped,
    /// Every item was inserted.
    Complete,
    /// Some items were inserted and some failed.
    Partial,
    /// The run inserted nothing.
    NothingInserted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub policy: SeedPolicy,
    pub inserted: usize,
    pub failed: Vec<FailedInsert>,
    /// Row count that caused a guarded run to skip.
    pub skipped_existing: Option<i64>,
}

impl SeedReport {
    fn new(policy: SeedPolicy) -> Self {
        Self {
            policy,
            inserted: 0,
            failed: Vec::new(),
            skipped_existing: None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped_existing.is_some()
    }

    pub fn outcome(&self) -> SeedOutcome {
        if self.is_skipped() {
            SeedOutcome::Skipped
        } else if self.inserted == 0 {
            SeedOutcome::NothingInserted
        } else if !self.failed.is_empty() {
            SeedOutcome::Partial
        } else {
            SeedOutcome::Complete
        }
    }
}

pub struct SeedService {
    repository: Arc<dyn CatalogRepository>,
}

impl SeedService {
    pub fn new(repository: Arc<dyn CatalogRepository>) -> Self {
        Self { repository }
    }

    pub async fn seed(
        &self,
        items: &[NewCatalogItem],
        policy: SeedPolicy,
    ) -> Result<SeedReport, SeedServiceError> {
        match policy {
            SeedPolicy::Guarded => self.seed_guarded(items).await,
            SeedPolicy::Append => Ok(self.seed_append(items).await),
        }
    }

    async fn seed_guarded(&self, items: &[NewCatalogItem]) -> Result<SeedReport, SeedServiceError> {
        let mut report = SeedReport::new(SeedPolicy::Guarded);

        let existing = self
            .repository
            .count_items()
            .await
            .map_err(SeedServiceError::CountFailed)?;

        if existing != 0 {
            info!("Catalog already has {} item(s), skipping seed", existing);
            report.skipped_existing = Some(existing);
            return Ok(report);
        }

        for item in items {
            match self.repository.insert_item(item).await {
                Ok(row) => {
                    info!("Inserted {} ({})", row.name, row.id);
                    report.inserted += 1;
                }
                Err(source) => {
                    error!("Failed to insert {}: {}", item.name, source);
                    return Err(SeedServiceError::InsertFailed {
                        item: item.name.clone(),
                        inserted: report.inserted,
                        source,
                    });
                }
            }
        }

        Ok(report)
    }

    async fn seed_append(&self, items: &[NewCatalogItem]) -> SeedReport {
        let mut report = SeedReport::new(SeedPolicy::Append);

        for item in items {
            match self.repository.insert_item(item).await {
                Ok(row) => {
                    info!("Inserted {} ({})", row.name, row.id);
                    report.inserted += 1;
                }
                Err(e) => {
                    warn!("Failed to insert {}: {}", item.name, e);
                    report.failed.push(FailedInsert {
                        item: item.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }
}

use crate::config::ConfigError;
use crate::repositories::RepositoryError;
use crate::seed_data::SeedDataError;
use crate::services::{SchemaServiceError, SeedServiceError};
use thiserror::Error;

// Type alias for Result with our AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Top-level failure of a bootstrap run, as reported to the operator.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The store could not be reached or rejected the credentials.
    #[error(
        "Could not connect to the database: {0}. Check the connection settings; \
         if the connection keeps failing, apply the statements from `cli schema print` \
         manually in the SQL editor"
    )]
    Connection(#[source] sqlx::Error),

    #[error("Schema bootstrap failed: {0}")]
    Schema(#[from] SchemaServiceError),

    #[error("Seeding failed: {0}")]
    Seed(#[from] SeedServiceError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Invalid seed data: {0}")]
    SeedData(#[from] SeedDataError),
}

pub mod bootstrap_service;
pub mod schema_service;
pub mod seed_service;

pub use bootstrap_service::{BootstrapPlan, BootstrapReport, BootstrapService};
pub use schema_service::{SchemaService, SchemaServiceError, SchemaStatus};
pub use seed_service::{
    FailedInsert, SeedOutcome, SeedPolicy, SeedReport, SeedService, SeedServiceError,
};

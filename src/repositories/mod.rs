pub mod catalog_repository;
pub mod schema_repository;

pub use catalog_repository::{
    CatalogRepository, PgCatalogRepository, RepositoryError, RepositoryResult,
};
pub use schema_repository::{PgSchemaRepository, SchemaRepository};

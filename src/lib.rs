pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod seed_data;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

pub use error::{AppError, Result};

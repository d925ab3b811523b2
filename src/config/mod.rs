pub mod database;
pub mod server;

pub use database::{DatabaseConfig, SslMode};
pub use server::ServerConfig;

/// Log filters used when `RUST_LOG` is unset.
pub const SERVER_LOG_FILTER: &str = "jewelstore=info,tower_http=debug";
pub const CLI_LOG_FILTER: &str = "jewelstore=info";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    #[test]
    fn default_log_filters_keep_crate_at_info() {
        for filter in [SERVER_LOG_FILTER, CLI_LOG_FILTER] {
            assert!(EnvFilter::try_new(filter).is_ok(), "{filter}");
            assert!(filter.split(',').any(|d| d == "jewelstore=info"), "{filter}");
        }
        assert!(SERVER_LOG_FILTER.contains("tower_http=debug"));
    }
}

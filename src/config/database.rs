use super::ConfigError;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::{env, fmt, str::FromStr};

/// Transport security for the store connection. `Require` encrypts the
/// connection but does not validate the server certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslMode {
    Disable,
    Prefer,
    #[default]
    Require,
}

impl FromStr for SslMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "disable" => Ok(SslMode::Disable),
            "prefer" => Ok(SslMode::Prefer),
            "require" => Ok(SslMode::Require),
            _ => Err(ConfigError::Invalid {
                key: "DB_SSL_MODE",
                value: s.to_string(),
            }),
        }
    }
}

impl From<SslMode> for PgSslMode {
    fn from(mode: SslMode) -> Self {
        match mode {
            SslMode::Disable => PgSslMode::Disable,
            SslMode::Prefer => PgSslMode::Prefer,
            SslMode::Require => PgSslMode::Require,
        }
    }
}

#[derive(Clone, PartialEq)]
pub enum DatabaseConfig {
    /// A full `postgres://` connection string.
    Url(String),
    Parts {
        host: String,
        port: u16,
        database: String,
        user: String,
        password: String,
        ssl_mode: SslMode,
    },
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseConfig::Url(_) => f
                .debug_tuple("DatabaseConfig::Url")
                .field(&"[REDACTED]")
                .finish(),
            DatabaseConfig::Parts {
                host,
                port,
                database,
                user,
                ssl_mode,
                ..
            } => f
                .debug_struct("DatabaseConfig::Parts")
                .field("host", host)
                .field("port", port)
                .field("database", database)
                .field("user", user)
                .field("password", &"[REDACTED]")
                .field("ssl_mode", ssl_mode)
                .finish(),
        }
    }
}

impl DatabaseConfig {
    /// Resolves the connection settings from the process environment.
    ///
    /// `DATABASE_URL` wins when present. Otherwise `DB_HOST` and `DB_PASSWORD`
    /// are required and `DB_PORT`, `DB_NAME`, `DB_USER` and `DB_SSL_MODE` fall
    /// back to Supabase's defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = get("DATABASE_URL") {
            return Ok(DatabaseConfig::Url(url));
        }

        let host = get("DB_HOST").ok_or(ConfigError::Missing("DATABASE_URL or DB_HOST"))?;
        let password = get("DB_PASSWORD").ok_or(ConfigError::Missing("DB_PASSWORD"))?;

        let port = match get("DB_PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "DB_PORT",
                value,
            })?,
            None => 5432,
        };

        let ssl_mode = match get("DB_SSL_MODE") {
            Some(value) => value.parse()?,
            None => SslMode::default(),
        };

        Ok(DatabaseConfig::Parts {
            host,
            port,
            database: get("DB_NAME").unwrap_or_else(|| "postgres".to_string()),
            user: get("DB_USER").unwrap_or_else(|| "postgres".to_string()),
            password,
            ssl_mode,
        })
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        match self {
            DatabaseConfig::Url(url) => {
                PgConnectOptions::from_str(url).map_err(|_| ConfigError::Invalid {
                    key: "DATABASE_URL",
                    value: "[REDACTED]".to_string(),
                })
            }
            DatabaseConfig::Parts {
                host,
                port,
                database,
                user,
                password,
                ssl_mode,
            } => Ok(PgConnectOptions::new()
                .host(host)
                .port(*port)
                .database(database)
                .username(user)
                .password(password)
                .ssl_mode((*ssl_mode).into())),
        }
    }

    /// Host and database name, safe to print.
    pub fn describe(&self) -> String {
        match self {
            DatabaseConfig::Url(_) => "DATABASE_URL".to_string(),
            DatabaseConfig::Parts {
                host,
                port,
                database,
                ..
            } => format!("{}:{}/{}", host, port, database),
        }
    }
}

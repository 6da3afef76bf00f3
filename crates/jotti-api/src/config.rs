//! Server configuration, read once from the environment at startup.

use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5000;

/// Typed server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// PostgreSQL connection string (`DATABASE_URL`).
    pub database_url: String,
    /// Bind address (`HOST`).
    pub host: String,
    /// Bind port (`PORT`).
    pub port: u16,
    /// Connection pool size (`DB_MAX_CONNECTIONS`).
    pub db_max_connections: u32,
    /// Deadline for a single event store call (`STORE_TIMEOUT_MS`).
    pub store_timeout: Duration,
    /// OTLP collector endpoint (`OTEL_EXPORTER_OTLP_ENDPOINT`). Span export
    /// is off when unset.
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `DATABASE_URL` is missing or a numeric
    /// variable does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable or `None` if it is unset.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config("DATABASE_URL environment variable must be set".into())
            })?;
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let db_max_connections =
            parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;
        let store_timeout_ms = parse_or(&lookup, "STORE_TIMEOUT_MS", DEFAULT_STORE_TIMEOUT_MS)?;
        if store_timeout_ms == 0 {
            return Err(AppError::Config(
                "STORE_TIMEOUT_MS must be greater than zero".into(),
            ));
        }
        let otlp_endpoint =
            lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|endpoint| !endpoint.trim().is_empty());

        Ok(Self {
            database_url,
            host,
            port,
            db_max_connections,
            store_timeout: Duration::from_millis(store_timeout_ms),
            otlp_endpoint,
        })
    }

    /// Returns `HOST:PORT`.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} is invalid: {e}"))),
    }
}

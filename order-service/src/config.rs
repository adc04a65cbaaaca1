//! Order service configuration

use crate::BoxError;

const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_NOTIFY_CAPACITY: usize = 256;

/// Order service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL; `None` runs on the in-memory store
    pub database_url: Option<String>,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Connection pool size
    pub db_max_connections: u32,
    /// Pool acquire timeout in seconds
    pub db_acquire_timeout_secs: u64,
    /// Capacity of the notification broadcast channel
    pub notify_channel_capacity: usize,
    /// Emit logs as JSON
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            http_port: DEFAULT_HTTP_PORT,
            environment: "development".into(),
            db_max_connections: DEFAULT_MAX_CONNECTIONS,
            db_acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
            notify_channel_capacity: DEFAULT_NOTIFY_CAPACITY,
            log_json: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.is_empty());
        Self::build(environment, database_url, |name| std::env::var(name).ok())
    }

    fn build(
        environment: String,
        database_url: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, BoxError> {
        if database_url.is_none() && environment != "development" {
            return Err(format!("DATABASE_URL must be set in {environment} environment").into());
        }
        let parse = |name: &str| lookup(name).map(|v| v.trim().to_string());

        Ok(Self {
            database_url,
            http_port: parse("HTTP_PORT")
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(DEFAULT_HTTP_PORT),
            db_max_connections: parse("DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            db_acquire_timeout_secs: parse("DB_ACQUIRE_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            notify_channel_capacity: parse("NOTIFY_CHANNEL_CAPACITY")
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_NOTIFY_CAPACITY),
            log_json: parse("LOG_JSON").is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true")),
            environment,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

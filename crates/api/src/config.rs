use std::time::Duration;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development
/// except `database_url`, which must be set.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `4000`).
    pub port: u16,
    /// Postgres connection string.
    pub database_url: String,
    /// Pool size (default: `25`).
    pub db_max_connections: u32,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background tasks (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Lifetime of activation tokens in hours (default: `72`).
    pub activation_token_ttl_hours: i64,
    /// Lifetime of authentication tokens in hours (default: `24`).
    pub auth_token_ttl_hours: i64,
    /// Interval between expired-token sweeps in seconds (default: `3600`).
    pub token_sweep_interval_secs: u64,
    /// `From` address used for outgoing mail.
    pub mail_sender: String,
}

/// A required variable was missing or a value failed to parse.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                  |
    /// |------------------------------|--------------------------|
    /// | `HOST`                       | `0.0.0.0`                |
    /// | `PORT`                       | `4000`                   |
    /// | `DATABASE_URL`               | required                 |
    /// | `DB_MAX_CONNECTIONS`         | `25`                     |
    /// | `CORS_ORIGINS`               | `http://localhost:3000`  |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                     |
    /// | `SHUTDOWN_TIMEOUT_SECS`      | `30`                     |
    /// | `ACTIVATION_TOKEN_TTL_HOURS` | `72`                     |
    /// | `AUTH_TOKEN_TTL_HOURS`       | `24`                     |
    /// | `TOKEN_SWEEP_INTERVAL_SECS`  | `3600`                   |
    /// | `MAIL_SENDER`                | `Greenlight <no-reply@greenlight.local>` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_var("PORT", "u16", 4000)?,
            database_url,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", "u32", 25)?,
            cors_origins,
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", "u64", 30)?,
            shutdown_timeout_secs: parse_var("SHUTDOWN_TIMEOUT_SECS", "u64", 30)?,
            activation_token_ttl_hours: parse_var("ACTIVATION_TOKEN_TTL_HOURS", "i64", 72)?,
            auth_token_ttl_hours: parse_var("AUTH_TOKEN_TTL_HOURS", "i64", 24)?,
            token_sweep_interval_secs: parse_var("TOKEN_SWEEP_INTERVAL_SECS", "u64", 3600)?,
            mail_sender: std::env::var("MAIL_SENDER")
                .unwrap_or_else(|_| "Greenlight <no-reply@greenlight.local>".into()),
        })
    }

    pub fn activation_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.activation_token_ttl_hours)
    }

    pub fn auth_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.auth_token_ttl_hours)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn token_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.token_sweep_interval_secs)
    }
}

fn parse_var<T: std::str::FromStr>(
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Err(_) => Ok(default),
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
    }
}

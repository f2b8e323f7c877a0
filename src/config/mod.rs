//! Application configuration loaded from environment.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Application configuration loaded from `.env` and environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (`0.0.0.0:$PORT`).
    pub server_addr: SocketAddr,
    /// Database connection and pool settings.
    pub database: DatabaseConfig,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

/// Everything needed to build the connection pool.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    /// Require TLS (certificate is not verified).
    pub ssl: bool,
    pub max_connections: u32,
    /// Idle connections older than this are closed.
    pub idle_timeout: Duration,
    /// Upper bound for acquiring a lease, including opening a new connection.
    pub connect_timeout: Duration,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .field("ssl", &self.ssl)
            .field("max_connections", &self.max_connections)
            .field("idle_timeout", &self.idle_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_POOL_MAX: u32 = 5;
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_millis(30_000);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5_000);

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup (the environment, or a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let server_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));

        let database = DatabaseConfig {
            host: required(&lookup, "DB_HOST")?,
            name: required(&lookup, "DB_NAME")?,
            user: required(&lookup, "DB_USER")?,
            password: required(&lookup, "DB_PASSWORD")?,
            port: parse_or(&lookup, "DB_PORT", DEFAULT_DB_PORT)?,
            ssl: lookup("DB_SSL")
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(true),
            max_connections: parse_or(&lookup, "PG_POOL_MAX", DEFAULT_POOL_MAX)?,
            idle_timeout: parse_or(&lookup, "PG_IDLE_TIMEOUT_MS", None)?
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_IDLE_TIMEOUT),
            connect_timeout: parse_or(&lookup, "PG_CONNECT_TIMEOUT_MS", None)?
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT),
        };

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            server_addr,
            database,
            log_level,
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigLoadError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigLoadError::Missing(key)),
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigLoadError>
where
    F: Fn(&str) -> Option<String>,
    T: ParseValue,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            T::parse_value(raw.trim()).ok_or(ConfigLoadError::Invalid { key, value: raw })
        }
        _ => Ok(default),
    }
}

/// Values that can be read from a single environment variable.
trait ParseValue: Sized {
    fn parse_value(raw: &str) -> Option<Self>;
}

impl ParseValue for u16 {
    fn parse_value(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl ParseValue for u32 {
    fn parse_value(raw: &str) -> Option<Self> {
        raw.parse().ok().filter(|n| *n > 0)
    }
}

impl ParseValue for Option<u64> {
    fn parse_value(raw: &str) -> Option<Self> {
        raw.parse().ok().map(Some)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

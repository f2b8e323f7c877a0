//! PostgreSQL connection pool.

use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};

use crate::config::DatabaseConfig;

pub type DbPool = sqlx::PgPool;

/// `Require` encrypts the transport without verifying the server certificate.
pub fn ssl_mode(ssl: bool) -> PgSslMode {
    if ssl {
        PgSslMode::Require
    } else {
        PgSslMode::Disable
    }
}

pub fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.name)
        .username(&config.user)
        .password(&config.password)
        .ssl_mode(ssl_mode(config.ssl))
}

pub fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(0)
        .idle_timeout(config.idle_timeout)
        .acquire_timeout(config.connect_timeout)
}

/// Build the pool without touching the network; the first lease opens the first connection.
pub fn create_pool(config: &DatabaseConfig) -> DbPool {
    pool_options(config).connect_lazy_with(connect_options(config))
}

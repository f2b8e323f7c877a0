//! Application error types for robust error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Client-facing message for every connection-class failure.
pub const CONNECTION_FAILED: &str = "DB connection failed";

/// A database failure, classified by whether the connection or the statement was at fault.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Pool exhausted or timed out, network/TLS failure, authentication rejected.
    #[error("connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// The pool has been shut down and no longer hands out leases.
    #[error("connection pool is closed")]
    Closed,

    /// The statement reached the database and failed there.
    #[error("{0}")]
    Query(#[source] sqlx::Error),
}

impl From<sqlx::Error> for GatewayError {
    fn from(e: sqlx::Error) -> Self {
        let connection_class = match &e {
            sqlx::Error::PoolClosed => return GatewayError::Closed,
            sqlx::Error::PoolTimedOut
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::WorkerCrashed => true,
            sqlx::Error::Database(db) => is_connection_sqlstate(db.code().as_deref()),
            _ => false,
        };

        if connection_class {
            GatewayError::Connection(e)
        } else {
            GatewayError::Query(e)
        }
    }
}

/// SQLSTATE class 28 (invalid authorization) and 08 (connection exception).
fn is_connection_sqlstate(code: Option<&str>) -> bool {
    code.is_some_and(|c| c.starts_with("28") || c.starts_with("08"))
}

impl GatewayError {
    pub fn is_connection(&self) -> bool {
        matches!(self, GatewayError::Connection(_) | GatewayError::Closed)
    }

    /// Reclassify as a connectivity failure, for callers probing reachability.
    pub fn into_connection(self) -> Self {
        match self {
            GatewayError::Query(e) => GatewayError::Connection(e),
            other => other,
        }
    }

    /// What the HTTP client gets to see. Connection details stay in the server log;
    /// database errors carry the server's own message without sqlx's prefix.
    pub fn client_message(&self) -> String {
        match self {
            GatewayError::Query(sqlx::Error::Database(db)) => db.message().to_string(),
            GatewayError::Query(e) => e.to_string(),
            _ => CONNECTION_FAILED.to_string(),
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigLoadError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Config(e) => e.to_string(),
            AppError::Gateway(e) => e.client_message(),
        };

        let body = Json(json!({ "error": message }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

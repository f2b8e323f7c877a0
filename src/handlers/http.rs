//! HTTP handlers: index, health, connectivity check, demo migration and item listing.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use tracing::error;

use crate::error::{AppResult, CONNECTION_FAILED};
use crate::services::gateway::{Gateway, MAX_ITEMS};

/// Shared application state; cloning only clones the pool handle.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
}

impl AppState {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }
}

/// Label written by every `/migrate` call.
pub const MIGRATION_LABEL: &str = "hello-from-eb";

const INDEX_TEXT: &str = "Hello from the Postgres demo service!\n\
Routes:\n  \
/health    -> 200 OK for load balancer health checks\n  \
/db        -> test DB connectivity (SELECT NOW())\n  \
/migrate   -> create demo table and insert a row\n  \
/items     -> list rows from demo table\n";

type JsonResponse = (StatusCode, Json<serde_json::Value>);

/// GET / — plaintext route listing.
pub async fn index() -> &'static str {
    INDEX_TEXT
}

/// GET /health — liveness probe; never waits on the database.
pub async fn health(State(state): State<AppState>) -> JsonResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": state.gateway().check_liveness() })),
    )
}

/// GET /db — round-trip to the database.
pub async fn db_check(State(state): State<AppState>) -> JsonResponse {
    match state.gateway().check_database_connectivity().await {
        Ok(now) => (StatusCode::OK, Json(json!({ "ok": true, "now": now }))),
        Err(e) => {
            error!(error = %e, "DB test error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "ok": false, "error": CONNECTION_FAILED })),
            )
        }
    }
}

/// GET /migrate — idempotent table creation plus one insert, in one transaction.
pub async fn migrate(State(state): State<AppState>) -> JsonResponse {
    match state.gateway().run_demo_migration(MIGRATION_LABEL).await {
        Ok(inserted) => (
            StatusCode::OK,
            Json(json!({ "migrated": true, "inserted": inserted })),
        ),
        Err(e) => {
            error!(error = %e, "migration error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "migrated": false, "error": e.client_message() })),
            )
        }
    }
}

/// GET /items — newest rows first, capped at 50.
pub async fn list_items(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let items = state
        .gateway()
        .list_demo_items(MAX_ITEMS)
        .await
        .inspect_err(|e| error!(error = %e, "list error"))?;

    Ok(Json(json!({ "count": items.len(), "items": items })))
}

//! Repositories: the `demo_items` table and server clock.
//!
//! Every function takes any Postgres executor so the same statement runs against the
//! pool (one lease per call) or inside a caller-owned transaction.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::error::GatewayResult;
use crate::models::DemoItem;

/// Key for the transaction-scoped advisory lock that serializes schema setup.
const DEMO_SCHEMA_LOCK: i64 = 0x6465_6d6f;

pub async fn server_now<'e>(executor: impl PgExecutor<'e>) -> GatewayResult<DateTime<Utc>> {
    let now = sqlx::query_scalar::<_, DateTime<Utc>>("SELECT NOW() AS now")
        .fetch_one(executor)
        .await?;
    Ok(now)
}

/// Blocks until no other transaction holds the schema lock; released on commit/rollback.
pub async fn lock_demo_schema<'e>(executor: impl PgExecutor<'e>) -> GatewayResult<()> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(DEMO_SCHEMA_LOCK)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn demo_items_create_table<'e>(executor: impl PgExecutor<'e>) -> GatewayResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS demo_items (
            id SERIAL PRIMARY KEY,
            label TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn demo_item_insert<'e>(
    executor: impl PgExecutor<'e>,
    label: &str,
) -> GatewayResult<DemoItem> {
    let row = sqlx::query_as::<_, DemoItem>(
        "INSERT INTO demo_items (label) VALUES ($1) RETURNING id, label, created_at",
    )
    .bind(label)
    .fetch_one(executor)
    .await?;
    Ok(row)
}

pub async fn demo_items_list<'e>(
    executor: impl PgExecutor<'e>,
    limit: i64,
) -> GatewayResult<Vec<DemoItem>> {
    let rows = sqlx::query_as::<_, DemoItem>(
        "SELECT id, label, created_at FROM demo_items ORDER BY id DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

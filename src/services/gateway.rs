//! Connection-pool gateway: every database access in the service goes through here.
//!
//! Each operation leases a connection for exactly as long as its statements run and hands
//! it back before returning. The pool bounds how many physical connections exist; callers
//! past that bound queue inside `acquire` until a lease is returned or the acquire timeout
//! fires (`GatewayError::Connection`).

use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::db::{self, DbPool};
use crate::error::GatewayResult;
use crate::models::DemoItem;

/// Upper bound on rows returned by [`Gateway::list_demo_items`].
pub const MAX_ITEMS: i64 = 50;

#[derive(Clone)]
pub struct Gateway {
    pool: DbPool,
}

impl Gateway {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Lazily connecting gateway; no connection is opened until the first lease.
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new(db::create_pool(config))
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Never touches the pool, so probes stay green while the database is down.
    pub fn check_liveness(&self) -> &'static str {
        "ok"
    }

    /// Round-trips `SELECT NOW()`. Every failure is reported as connection-class.
    pub async fn check_database_connectivity(&self) -> GatewayResult<DateTime<Utc>> {
        db::server_now(&self.pool)
            .await
            .map_err(|e| e.into_connection())
    }

    /// Create `demo_items` if needed and insert one row, atomically.
    ///
    /// On failure the transaction is rolled back explicitly. A failing rollback is only
    /// logged: the caller always gets the error that aborted the migration.
    pub async fn run_demo_migration(&self, label: &str) -> GatewayResult<DemoItem> {
        let mut tx = self.pool.begin().await?;

        match Self::migrate_in(&mut tx, label).await {
            Ok(item) => {
                tx.commit().await?;
                info!(id = item.id, label = %item.label, "demo migration committed");
                Ok(item)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "rollback after failed migration also failed");
                }
                Err(e)
            }
        }
    }

    async fn migrate_in(
        tx: &mut Transaction<'static, Postgres>,
        label: &str,
    ) -> GatewayResult<DemoItem> {
        db::lock_demo_schema(&mut **tx).await?;
        db::demo_items_create_table(&mut **tx).await?;
        db::demo_item_insert(&mut **tx, label).await
    }

    /// Newest rows first, at most `min(limit, MAX_ITEMS)` of them.
    pub async fn list_demo_items(&self, limit: i64) -> GatewayResult<Vec<DemoItem>> {
        let limit = limit.clamp(0, MAX_ITEMS);
        let items = db::demo_items_list(&self.pool, limit).await?;
        debug!(limit, count = items.len(), "listed demo items");
        Ok(items)
    }

    /// Stop leasing, wait for outstanding leases to come back, then close every connection.
    /// Safe to call more than once.
    pub async fn shutdown(&self) {
        if self.pool.is_closed() {
            return;
        }
        info!(
            size = self.pool.size(),
            idle = self.pool.num_idle(),
            "closing database pool"
        );
        self.pool.close().await;
        info!("database pool closed");
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use std::time::{Duration, Instant};

    /// Points at a local port nothing listens on.
    fn unreachable_config() -> DatabaseConfig {
        DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            name: "demo".to_string(),
            user: "demo".to_string(),
            password: "demo".to_string(),
            ssl: false,
            max_connections: 1,
            idle_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_millis(500),
        }
    }

    #[tokio::test]
    async fn liveness_ignores_database() {
        let gateway = Gateway::from_config(&unreachable_config());
        assert_eq!(gateway.check_liveness(), "ok");
        assert_eq!(gateway.pool().size(), 0);
    }

    #[tokio::test]
    async fn unreachable_database_fails_within_timeout() {
        let gateway = Gateway::from_config(&unreachable_config());
        let started = Instant::now();
        let err = gateway.check_database_connectivity().await.unwrap_err();
        assert!(err.is_connection(), "unexpected error: {err:?}");
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn migration_against_unreachable_database_is_connection_error() {
        let gateway = Gateway::from_config(&unreachable_config());
        let err = gateway.run_demo_migration("x").await.unwrap_err();
        assert!(err.is_connection());
    }

    #[tokio::test]
    async fn shutdown_rejects_new_leases_and_is_idempotent() {
        let gateway = Gateway::from_config(&unreachable_config());
        gateway.shutdown().await;
        gateway.shutdown().await;
        assert!(gateway.is_closed());

        let err = gateway.list_demo_items(MAX_ITEMS).await.unwrap_err();
        assert!(matches!(err, GatewayError::Closed));
        assert_eq!(gateway.check_liveness(), "ok");
    }
}

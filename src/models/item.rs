//! Row model for the demo table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// One row of `demo_items`. Rows are only ever inserted, never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct DemoItem {
    pub id: i32,
    pub label: String,
    pub created_at: DateTime<Utc>,
}

//! Cost entry entity model and DTOs.

use promptforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An immutable row from the `cost_entries` table: one billable
/// provider operation within a run.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CostEntry {
    pub id: DbId,
    pub pipeline_run_id: DbId,
    pub pipeline_step_id: Option<DbId>,
    pub account_id: DbId,
    pub assistant_id: DbId,
    pub operation: String,
    pub model: String,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub cache_read_tokens: i64,
    pub cache_write_tokens: i64,
    pub cost_usd: f64,
    pub created_at: Timestamp,
}

/// Input for inserting a cost entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCostEntry {
    pub pipeline_run_id: DbId,
    pub pipeline_step_id: Option<DbId>,
    pub account_id: DbId,
    pub assistant_id: DbId,
    pub operation: String,
    pub model: String,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub cache_read_tokens: i64,
    pub cache_write_tokens: i64,
    pub cost_usd: f64,
}

/// Aggregate totals for a run, computed server-side.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RunCostTotals {
    pub entry_count: i64,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub cost_usd: f64,
}

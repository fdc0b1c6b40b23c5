//! Pipeline run entity model and DTOs.

use promptforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `pipeline_runs` table: one execution of the
/// orchestrator for one briefing.
///
/// The token/cost totals are denormalized and recomputed by a database
/// trigger whenever a cost entry is inserted; the engine never writes
/// them directly.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PipelineRun {
    pub id: DbId,
    /// Locally generated key: `pipeline_` plus a 32-hex-char UUID,
    /// e.g. `pipeline_8f14e45fceea167a5a36dedd4bea2543`.
    pub run_key: String,
    pub account_id: DbId,
    pub assistant_id: DbId,
    pub briefing_id: String,
    pub status: String,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub duration_ms: Option<i64>,
    pub error_message: Option<String>,
    pub total_input_tokens: i64,
    pub total_output_tokens: i64,
    pub total_cost_usd: f64,
    pub created_at: Timestamp,
}

/// Input for creating a run row at run start.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePipelineRun {
    pub run_key: String,
    pub account_id: DbId,
    pub assistant_id: DbId,
    pub briefing_id: String,
}

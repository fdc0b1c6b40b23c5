//! Pipeline step entity model.

use promptforge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `pipeline_steps` table: one named phase of a run.
///
/// Steps are bulk-created as `pending` at run start and transitioned by
/// the orchestrator; those transitions are fire-and-forget relative to
/// the run's own success.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PipelineStep {
    pub id: DbId,
    pub pipeline_run_id: DbId,
    pub step_name: String,
    pub step_order: i32,
    pub status: String,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
}

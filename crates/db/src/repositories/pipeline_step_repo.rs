//! Repository for the `pipeline_steps` table.
//!
//! Steps are bulk-created as `pending` at run start; the orchestrator
//! mirrors its in-memory transitions here fire-and-forget.

use promptforge_core::steps::{StepStatus, STEP_SEQUENCE};
use promptforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::pipeline_step::PipelineStep;

/// Column list for pipeline_steps queries.
const COLUMNS: &str = "id, pipeline_run_id, step_name, step_order, status, \
    started_at, completed_at, error_message, created_at";

/// Provides lifecycle operations for pipeline steps.
pub struct PipelineStepRepo;

impl PipelineStepRepo {
    /// Bulk-create the fixed step sequence for a run, all `pending`.
    /// Rows come back in step order.
    pub async fn create_for_run(
        pool: &PgPool,
        run_id: DbId,
    ) -> Result<Vec<PipelineStep>, sqlx::Error> {
        let names: Vec<String> = STEP_SEQUENCE.iter().map(|s| s.as_str().to_string()).collect();
        let orders: Vec<i32> = STEP_SEQUENCE.iter().map(|s| s.order()).collect();
        let query = format!(
            "INSERT INTO pipeline_steps (pipeline_run_id, step_name, step_order, status)
             SELECT $1, name, ord, $2
             FROM UNNEST($3::TEXT[], $4::INT[]) AS t(name, ord)
             RETURNING {COLUMNS}"
        );
        let mut steps = sqlx::query_as::<_, PipelineStep>(&query)
            .bind(run_id)
            .bind(StepStatus::Pending.as_str())
            .bind(&names)
            .bind(&orders)
            .fetch_all(pool)
            .await?;
        steps.sort_by_key(|s| s.step_order);
        Ok(steps)
    }

    /// Transition a step to `running` and stamp `started_at`.
    pub async fn mark_running(pool: &PgPool, step_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE pipeline_steps SET status = $2, started_at = NOW() WHERE id = $1",
        )
        .bind(step_id)
        .bind(StepStatus::Running.as_str())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Transition a step to `completed` and stamp `completed_at`.
    pub async fn mark_completed(pool: &PgPool, step_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE pipeline_steps SET status = $2, completed_at = NOW() WHERE id = $1",
        )
        .bind(step_id)
        .bind(StepStatus::Completed.as_str())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Transition a step to `failed` with an explanatory message.
    pub async fn mark_failed(
        pool: &PgPool,
        step_id: DbId,
        error_message: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE pipeline_steps SET
                status = $2,
                completed_at = NOW(),
                error_message = $3
             WHERE id = $1",
        )
        .bind(step_id)
        .bind(StepStatus::Failed.as_str())
        .bind(error_message)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// List all steps for a run in step order.
    pub async fn list_for_run(
        pool: &PgPool,
        run_id: DbId,
    ) -> Result<Vec<PipelineStep>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pipeline_steps
             WHERE pipeline_run_id = $1
             ORDER BY step_order ASC"
        );
        sqlx::query_as::<_, PipelineStep>(&query)
            .bind(run_id)
            .fetch_all(pool)
            .await
    }
}

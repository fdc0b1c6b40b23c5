//! Repository for the `pipeline_runs` table.
//!
//! A run has exactly one terminal transition: `mark_completed` or
//! `mark_failed`, both guarded by `status = 'running'` so a second
//! terminal write is a no-op.

use promptforge_core::steps::RunStatus;
use promptforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::pipeline_run::{CreatePipelineRun, PipelineRun};

/// Column list for pipeline_runs queries.
const COLUMNS: &str = "id, run_key, account_id, assistant_id, briefing_id, status, \
    started_at, completed_at, duration_ms, error_message, \
    total_input_tokens, total_output_tokens, total_cost_usd, created_at";

/// Provides lifecycle operations for pipeline runs.
pub struct PipelineRunRepo;

impl PipelineRunRepo {
    /// Create a new run in `running` status.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePipelineRun,
    ) -> Result<PipelineRun, sqlx::Error> {
        let query = format!(
            "INSERT INTO pipeline_runs
                (run_key, account_id, assistant_id, briefing_id, status)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PipelineRun>(&query)
            .bind(&input.run_key)
            .bind(input.account_id)
            .bind(input.assistant_id)
            .bind(&input.briefing_id)
            .bind(RunStatus::Running.as_str())
            .fetch_one(pool)
            .await
    }

    /// Mark a run as completed with its duration.
    /// Returns `true` if the row transitioned.
    pub async fn mark_completed(
        pool: &PgPool,
        run_id: DbId,
        duration_ms: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE pipeline_runs SET
                status = $2,
                completed_at = NOW(),
                duration_ms = $3
             WHERE id = $1 AND status = $4",
        )
        .bind(run_id)
        .bind(RunStatus::Completed.as_str())
        .bind(duration_ms)
        .bind(RunStatus::Running.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a run as failed with its duration and error message.
    /// Returns `true` if the row transitioned.
    pub async fn mark_failed(
        pool: &PgPool,
        run_id: DbId,
        duration_ms: i64,
        error_message: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE pipeline_runs SET
                status = $2,
                completed_at = NOW(),
                duration_ms = $3,
                error_message = $4
             WHERE id = $1 AND status = $5",
        )
        .bind(run_id)
        .bind(RunStatus::Failed.as_str())
        .bind(duration_ms)
        .bind(error_message)
        .bind(RunStatus::Running.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a run by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PipelineRun>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pipeline_runs WHERE id = $1");
        sqlx::query_as::<_, PipelineRun>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a run by its locally generated key.
    pub async fn find_by_key(
        pool: &PgPool,
        run_key: &str,
    ) -> Result<Option<PipelineRun>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pipeline_runs WHERE run_key = $1");
        sqlx::query_as::<_, PipelineRun>(&query)
            .bind(run_key)
            .fetch_optional(pool)
            .await
    }

    /// List runs for an assistant, newest first.
    pub async fn list_for_assistant(
        pool: &PgPool,
        assistant_id: DbId,
        limit: i64,
    ) -> Result<Vec<PipelineRun>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pipeline_runs
             WHERE assistant_id = $1
             ORDER BY started_at DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, PipelineRun>(&query)
            .bind(assistant_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}

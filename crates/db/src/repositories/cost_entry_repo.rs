//! Repository for the `cost_entries` table.
//!
//! Entries are immutable once created. Run totals are recomputed by a
//! database trigger on insert, never by this repository.

use promptforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::cost_entry::{CostEntry, CreateCostEntry, RunCostTotals};

/// Column list for cost_entries queries.
const COLUMNS: &str = "id, pipeline_run_id, pipeline_step_id, account_id, assistant_id, \
    operation, model, input_tokens, output_tokens, cache_read_tokens, \
    cache_write_tokens, cost_usd, created_at";

/// Provides insert and query operations for cost entries.
pub struct CostEntryRepo;

impl CostEntryRepo {
    /// Insert one cost entry, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCostEntry,
    ) -> Result<CostEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO cost_entries
                (pipeline_run_id, pipeline_step_id, account_id, assistant_id,
                 operation, model, input_tokens, output_tokens,
                 cache_read_tokens, cache_write_tokens, cost_usd)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CostEntry>(&query)
            .bind(input.pipeline_run_id)
            .bind(input.pipeline_step_id)
            .bind(input.account_id)
            .bind(input.assistant_id)
            .bind(&input.operation)
            .bind(&input.model)
            .bind(input.input_tokens)
            .bind(input.output_tokens)
            .bind(input.cache_read_tokens)
            .bind(input.cache_write_tokens)
            .bind(input.cost_usd)
            .fetch_one(pool)
            .await
    }

    /// List entries for a run in insertion order.
    pub async fn list_for_run(
        pool: &PgPool,
        run_id: DbId,
    ) -> Result<Vec<CostEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cost_entries
             WHERE pipeline_run_id = $1
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, CostEntry>(&query)
            .bind(run_id)
            .fetch_all(pool)
            .await
    }

    /// Server-side aggregate totals for a run.
    pub async fn totals_for_run(
        pool: &PgPool,
        run_id: DbId,
    ) -> Result<RunCostTotals, sqlx::Error> {
        sqlx::query_as::<_, RunCostTotals>(
            "SELECT COUNT(*) AS entry_count,
                    COALESCE(SUM(input_tokens), 0)::BIGINT AS input_tokens,
                    COALESCE(SUM(output_tokens), 0)::BIGINT AS output_tokens,
                    COALESCE(SUM(cost_usd), 0)::DOUBLE PRECISION AS cost_usd
             FROM cost_entries
             WHERE pipeline_run_id = $1",
        )
        .bind(run_id)
        .fetch_one(pool)
        .await
    }

    /// Lifetime spend for an assistant across all runs.
    pub async fn total_for_assistant(
        pool: &PgPool,
        assistant_id: DbId,
    ) -> Result<f64, sqlx::Error> {
        let row: (f64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(cost_usd), 0)::DOUBLE PRECISION
             FROM cost_entries
             WHERE assistant_id = $1",
        )
        .bind(assistant_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}

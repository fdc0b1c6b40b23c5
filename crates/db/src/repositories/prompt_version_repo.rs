//! Repository for the `prompt_versions` table.

use promptforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::prompt_version::{CreatePromptVersion, PromptVersion};

/// Column list for prompt_versions queries.
const COLUMNS: &str = "id, assistant_id, version, version_number, prompt_content, \
    prompt_hash, injection_content, briefing_hash, total_iterations, status, created_at";

/// Status assigned to freshly created versions.
const STATUS_DRAFT: &str = "draft";

/// Provides version-counter and CRUD operations for prompt versions.
pub struct PromptVersionRepo;

impl PromptVersionRepo {
    /// Next version number for an assistant: highest existing + 1.
    ///
    /// Read-then-write with no transactional guard; concurrent runs for
    /// the same assistant can read the same value. The UNIQUE constraint
    /// on (assistant_id, version_number) turns that collision into an
    /// insert error instead of a silent duplicate.
    pub async fn next_version_number(
        pool: &PgPool,
        assistant_id: DbId,
    ) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(version_number), 0) + 1
             FROM prompt_versions
             WHERE assistant_id = $1",
        )
        .bind(assistant_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Insert a new prompt version in `draft` status.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePromptVersion,
    ) -> Result<PromptVersion, sqlx::Error> {
        let query = format!(
            "INSERT INTO prompt_versions
                (assistant_id, version, version_number, prompt_content,
                 prompt_hash, injection_content, briefing_hash,
                 total_iterations, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PromptVersion>(&query)
            .bind(input.assistant_id)
            .bind(&input.version)
            .bind(input.version_number)
            .bind(&input.prompt_content)
            .bind(&input.prompt_hash)
            .bind(&input.injection_content)
            .bind(&input.briefing_hash)
            .bind(input.total_iterations)
            .bind(STATUS_DRAFT)
            .fetch_one(pool)
            .await
    }

    /// Find a prompt version by its primary key.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PromptVersion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM prompt_versions WHERE id = $1");
        sqlx::query_as::<_, PromptVersion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a specific version by assistant and version number.
    pub async fn find_by_assistant_and_number(
        pool: &PgPool,
        assistant_id: DbId,
        version_number: i32,
    ) -> Result<Option<PromptVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM prompt_versions
             WHERE assistant_id = $1 AND version_number = $2"
        );
        sqlx::query_as::<_, PromptVersion>(&query)
            .bind(assistant_id)
            .bind(version_number)
            .fetch_optional(pool)
            .await
    }

    /// Get the latest (highest version number) version for an assistant.
    pub async fn get_latest(
        pool: &PgPool,
        assistant_id: DbId,
    ) -> Result<Option<PromptVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM prompt_versions
             WHERE assistant_id = $1
             ORDER BY version_number DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, PromptVersion>(&query)
            .bind(assistant_id)
            .fetch_optional(pool)
            .await
    }

    /// List versions for an assistant, newest first.
    pub async fn list_for_assistant(
        pool: &PgPool,
        assistant_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PromptVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM prompt_versions
             WHERE assistant_id = $1
             ORDER BY version_number DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, PromptVersion>(&query)
            .bind(assistant_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count the total number of versions for an assistant.
    pub async fn count_for_assistant(
        pool: &PgPool,
        assistant_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM prompt_versions WHERE assistant_id = $1")
                .bind(assistant_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }
}

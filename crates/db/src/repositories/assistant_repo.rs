//! Repository for the `assistants` table.

use promptforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::assistant::{Assistant, CreateAssistant};

/// Column list for assistants queries.
const COLUMNS: &str = "id, account_id, assistant_key, display_name, created_at";

/// Provides get-or-create and lookup operations for assistants.
pub struct AssistantRepo;

impl AssistantRepo {
    /// Find an assistant by account and key, creating it if it does not
    /// exist.
    pub async fn get_or_create(
        pool: &PgPool,
        input: &CreateAssistant,
    ) -> Result<Assistant, sqlx::Error> {
        let query = format!(
            "INSERT INTO assistants (account_id, assistant_key, display_name)
             VALUES ($1, $2, $3)
             ON CONFLICT (account_id, assistant_key)
             DO UPDATE SET assistant_key = EXCLUDED.assistant_key
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assistant>(&query)
            .bind(input.account_id)
            .bind(&input.assistant_key)
            .bind(&input.display_name)
            .fetch_one(pool)
            .await
    }

    /// Find an assistant by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Assistant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assistants WHERE id = $1");
        sqlx::query_as::<_, Assistant>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List assistants for an account, oldest first.
    pub async fn list_for_account(
        pool: &PgPool,
        account_id: DbId,
    ) -> Result<Vec<Assistant>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM assistants
             WHERE account_id = $1
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Assistant>(&query)
            .bind(account_id)
            .fetch_all(pool)
            .await
    }
}

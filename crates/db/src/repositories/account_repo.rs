//! Repository for the `accounts` table.

use promptforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::account::{Account, CreateAccount};

/// Column list for accounts queries.
const COLUMNS: &str = "id, account_key, display_name, created_at";

/// Provides get-or-create and lookup operations for accounts.
pub struct AccountRepo;

impl AccountRepo {
    /// Find an account by its caller-provided key, creating it if it
    /// does not exist. The no-op `DO UPDATE` makes the insert return
    /// the existing row on conflict.
    pub async fn get_or_create(
        pool: &PgPool,
        input: &CreateAccount,
    ) -> Result<Account, sqlx::Error> {
        let query = format!(
            "INSERT INTO accounts (account_key, display_name)
             VALUES ($1, $2)
             ON CONFLICT (account_key)
             DO UPDATE SET account_key = EXCLUDED.account_key
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(&input.account_key)
            .bind(&input.display_name)
            .fetch_one(pool)
            .await
    }

    /// Find an account by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE id = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an account by its caller-provided key.
    pub async fn find_by_key(pool: &PgPool, key: &str) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE account_key = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }
}

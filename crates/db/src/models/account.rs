//! Account entity model.

use promptforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `accounts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Account {
    pub id: DbId,
    /// Caller-provided stable identifier, unique across accounts.
    pub account_key: String,
    pub display_name: Option<String>,
    pub created_at: Timestamp,
}

/// Input for creating an account on first use.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccount {
    pub account_key: String,
    pub display_name: Option<String>,
}

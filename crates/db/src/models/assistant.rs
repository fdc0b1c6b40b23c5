//! Assistant entity model.

use promptforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `assistants` table. Assistants scope generated
/// artifacts and cost records within an account.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Assistant {
    pub id: DbId,
    pub account_id: DbId,
    /// Caller-provided stable identifier, unique within the account.
    pub assistant_key: String,
    pub display_name: Option<String>,
    pub created_at: Timestamp,
}

/// Input for creating an assistant on first use.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssistant {
    pub account_id: DbId,
    pub assistant_key: String,
    pub display_name: Option<String>,
}

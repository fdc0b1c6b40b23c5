//! Prompt version entity model and DTOs.

use promptforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `prompt_versions` table: the durable artifact of a
/// successful run.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PromptVersion {
    pub id: DbId,
    pub assistant_id: DbId,
    /// Display label, e.g. `v3`.
    pub version: String,
    pub version_number: i32,
    pub prompt_content: String,
    pub prompt_hash: String,
    /// Packaged, deployable form of the prompt.
    pub injection_content: String,
    pub briefing_hash: String,
    pub total_iterations: i32,
    pub status: String,
    pub created_at: Timestamp,
}

/// Input for inserting a prompt version. New versions start as `draft`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePromptVersion {
    pub assistant_id: DbId,
    pub version: String,
    pub version_number: i32,
    pub prompt_content: String,
    pub prompt_hash: String,
    pub injection_content: String,
    pub briefing_hash: String,
    pub total_iterations: i32,
}

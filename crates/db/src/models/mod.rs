//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts

pub mod account;
pub mod assistant;
pub mod cost_entry;
pub mod pipeline_run;
pub mod pipeline_step;
pub mod prompt_version;

//! One unit-struct repository per table, all methods taking `&PgPool`.

mod account_repo;
mod assistant_repo;
mod cost_entry_repo;
mod pipeline_run_repo;
mod pipeline_step_repo;
mod prompt_version_repo;

pub use account_repo::AccountRepo;
pub use assistant_repo::AssistantRepo;
pub use cost_entry_repo::CostEntryRepo;
pub use pipeline_run_repo::PipelineRunRepo;
pub use pipeline_step_repo::PipelineStepRepo;
pub use prompt_version_repo::PromptVersionRepo;

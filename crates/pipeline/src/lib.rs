//! Pipeline orchestration engine.
//!
//! Drives the fixed step sequence (account config, prompt generation,
//! versioning, packaging, persistence, cost logging) against the
//! completion provider, with a per-run usage ledger and best-effort
//! durable persistence. The entry point is
//! [`orchestrator::run_pipeline`].

pub mod config;
pub mod context;
pub mod costlog;
pub mod orchestrator;
pub mod prompts;
pub mod refine;
pub mod registry;
pub mod runner;
pub mod version;

pub use config::PipelineConfig;
pub use context::{
    PersistenceError, PgRunPersistence, PromptVersionDraft, RunIdentity, RunPersistence, RunRecord,
};
pub use orchestrator::{run_pipeline, PipelineInput, PipelineResult, StepReport};
pub use registry::{AccountConfig, AccountRegistry, CredentialCheck, EnvAccountRegistry};

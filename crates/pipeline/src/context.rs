//! Durable run persistence: the trait seam and its Postgres backend.
//!
//! The orchestrator talks to [`RunPersistence`] and [`RunRecord`], the
//! same kind of seam it uses for the completion provider and the
//! spreadsheet sink. Initialization happens at run entry, before the
//! first step, so even a run that fails immediately leaves a failed run
//! row behind. Mirror calls swallow their own errors with a log line; a
//! database outage degrades the run to local-only mode instead of
//! failing it.

use std::collections::HashMap;

use async_trait::async_trait;
use promptforge_core::ledger::CostRecord;
use promptforge_core::steps::StepName;
use promptforge_core::types::DbId;
use promptforge_db::models::account::{Account, CreateAccount};
use promptforge_db::models::assistant::{Assistant, CreateAssistant};
use promptforge_db::models::cost_entry::CreateCostEntry;
use promptforge_db::models::pipeline_run::{CreatePipelineRun, PipelineRun};
use promptforge_db::models::prompt_version::CreatePromptVersion;
use promptforge_db::repositories::AccountRepo;
use promptforge_db::repositories::AssistantRepo;
use promptforge_db::repositories::CostEntryRepo;
use promptforge_db::repositories::PipelineRunRepo;
use promptforge_db::repositories::PipelineStepRepo;
use promptforge_db::repositories::PromptVersionRepo;
use sqlx::PgPool;

/// Identity fields that name one run's durable rows.
#[derive(Debug, Clone)]
pub struct RunIdentity {
    pub run_key: String,
    pub account_key: String,
    pub assistant_key: String,
    pub briefing_id: String,
}

/// Prompt version payload handed to the durable store.
#[derive(Debug, Clone)]
pub struct PromptVersionDraft {
    pub version: String,
    pub version_number: i32,
    pub prompt_content: String,
    pub prompt_hash: String,
    pub injection_content: String,
    pub briefing_hash: String,
    pub total_iterations: i32,
}

/// Failure inside a durable store operation.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct PersistenceError(pub String);

/// Entry seam for durable run state. Called once at run start, before
/// the first step; `None` means the run proceeds without durable state.
#[async_trait]
pub trait RunPersistence: Send + Sync {
    async fn begin_run(&self, identity: &RunIdentity) -> Option<Box<dyn RunRecord>>;
}

/// Durable record of one live run. The mirroring methods are
/// best-effort and never fail the run; the store operations return
/// errors for the caller's step report.
#[async_trait]
pub trait RunRecord: Send + Sync {
    async fn step_started(&self, step: StepName);
    async fn step_completed(&self, step: StepName);
    async fn step_failed(&self, step: StepName, message: &str);
    async fn run_completed(&self, duration_ms: i64);
    async fn run_failed(&self, duration_ms: i64, message: &str);

    /// Next free version number for the run's assistant.
    async fn next_version_number(&self) -> Result<i32, PersistenceError>;
    async fn save_prompt_version(&self, draft: &PromptVersionDraft)
        -> Result<(), PersistenceError>;
    /// Insert one cost entry per ledger record.
    async fn record_costs(&self, records: &[CostRecord]) -> Result<(), PersistenceError>;
}

/// Postgres-backed [`RunPersistence`].
pub struct PgRunPersistence {
    pool: PgPool,
}

impl PgRunPersistence {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RunPersistence for PgRunPersistence {
    async fn begin_run(&self, identity: &RunIdentity) -> Option<Box<dyn RunRecord>> {
        PersistenceContext::init(&self.pool, identity)
            .await
            .map(|ctx| Box::new(ctx) as Box<dyn RunRecord>)
    }
}

/// Durable identities for one run: account, assistant, run row, and the
/// pre-created step rows keyed by step name.
struct PersistenceContext {
    pool: PgPool,
    account: Account,
    assistant: Assistant,
    run: PipelineRun,
    step_ids: HashMap<StepName, DbId>,
}

impl PersistenceContext {
    /// Get-or-create the account and assistant, insert the run row, and
    /// bulk-insert one pending row per step. Any failure logs and
    /// returns `None`; the run then proceeds without durable state.
    async fn init(pool: &PgPool, identity: &RunIdentity) -> Option<Self> {
        match Self::try_init(pool, identity).await {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                tracing::error!(
                    run_key = %identity.run_key,
                    error = %e,
                    "Failed to initialize persistence context, continuing without durable state",
                );
                None
            }
        }
    }

    async fn try_init(pool: &PgPool, identity: &RunIdentity) -> Result<Self, sqlx::Error> {
        // Display names are maintained out of band; the rows only need
        // the keys, which lets the run attach before the account config
        // is resolved.
        let account = AccountRepo::get_or_create(
            pool,
            &CreateAccount {
                account_key: identity.account_key.clone(),
                display_name: None,
            },
        )
        .await?;

        let assistant = AssistantRepo::get_or_create(
            pool,
            &CreateAssistant {
                account_id: account.id,
                assistant_key: identity.assistant_key.clone(),
                display_name: None,
            },
        )
        .await?;

        let run = PipelineRunRepo::create(
            pool,
            &CreatePipelineRun {
                run_key: identity.run_key.clone(),
                account_id: account.id,
                assistant_id: assistant.id,
                briefing_id: identity.briefing_id.clone(),
            },
        )
        .await?;

        let steps = PipelineStepRepo::create_for_run(pool, run.id).await?;
        let step_ids = steps
            .iter()
            .filter_map(|s| {
                STEP_BY_NAME
                    .iter()
                    .find(|(name, _)| *name == s.step_name)
                    .map(|(_, step)| (*step, s.id))
            })
            .collect();

        tracing::info!(run_key = %identity.run_key, run_id = run.id, "Persistence context ready");
        Ok(Self {
            pool: pool.clone(),
            account,
            assistant,
            run,
            step_ids,
        })
    }

    /// Durable row id of a step, when its row was created.
    fn step_id(&self, step: StepName) -> Option<DbId> {
        self.step_ids.get(&step).copied()
    }
}

#[async_trait]
impl RunRecord for PersistenceContext {
    // ---- step mirroring, best-effort ----

    async fn step_started(&self, step: StepName) {
        if let Some(id) = self.step_id(step) {
            if let Err(e) = PipelineStepRepo::mark_running(&self.pool, id).await {
                tracing::error!(step = step.as_str(), error = %e, "Failed to mark step running");
            }
        }
    }

    async fn step_completed(&self, step: StepName) {
        if let Some(id) = self.step_id(step) {
            if let Err(e) = PipelineStepRepo::mark_completed(&self.pool, id).await {
                tracing::error!(step = step.as_str(), error = %e, "Failed to mark step completed");
            }
        }
    }

    async fn step_failed(&self, step: StepName, message: &str) {
        if let Some(id) = self.step_id(step) {
            if let Err(e) = PipelineStepRepo::mark_failed(&self.pool, id, message).await {
                tracing::error!(step = step.as_str(), error = %e, "Failed to mark step failed");
            }
        }
    }

    // ---- run terminal states, best-effort ----

    async fn run_completed(&self, duration_ms: i64) {
        if let Err(e) =
            PipelineRunRepo::mark_completed(&self.pool, self.run.id, duration_ms).await
        {
            tracing::error!(run_id = self.run.id, error = %e, "Failed to mark run completed");
        }
    }

    async fn run_failed(&self, duration_ms: i64, message: &str) {
        if let Err(e) =
            PipelineRunRepo::mark_failed(&self.pool, self.run.id, duration_ms, message).await
        {
            tracing::error!(run_id = self.run.id, error = %e, "Failed to mark run failed");
        }
    }

    // ---- store operations, errors surface in the step report ----

    async fn next_version_number(&self) -> Result<i32, PersistenceError> {
        PromptVersionRepo::next_version_number(&self.pool, self.assistant.id)
            .await
            .map_err(|e| PersistenceError(e.to_string()))
    }

    async fn save_prompt_version(
        &self,
        draft: &PromptVersionDraft,
    ) -> Result<(), PersistenceError> {
        let input = CreatePromptVersion {
            assistant_id: self.assistant.id,
            version: draft.version.clone(),
            version_number: draft.version_number,
            prompt_content: draft.prompt_content.clone(),
            prompt_hash: draft.prompt_hash.clone(),
            injection_content: draft.injection_content.clone(),
            briefing_hash: draft.briefing_hash.clone(),
            total_iterations: draft.total_iterations,
        };
        let saved = PromptVersionRepo::create(&self.pool, &input)
            .await
            .map_err(|e| PersistenceError(e.to_string()))?;
        tracing::info!(
            version = %saved.version,
            prompt_version_id = saved.id,
            "Prompt version saved",
        );
        Ok(())
    }

    /// Stops at the first failed insert.
    async fn record_costs(&self, records: &[CostRecord]) -> Result<(), PersistenceError> {
        let step_id = self.step_id(StepName::GeneratePrompt);
        for record in records {
            CostEntryRepo::create(
                &self.pool,
                &CreateCostEntry {
                    pipeline_run_id: self.run.id,
                    pipeline_step_id: step_id,
                    account_id: self.account.id,
                    assistant_id: self.assistant.id,
                    operation: record.operation.as_str().to_string(),
                    model: record.model.clone(),
                    input_tokens: record.usage.input_tokens,
                    output_tokens: record.usage.output_tokens,
                    cache_read_tokens: record.usage.cache_read_tokens,
                    cache_write_tokens: record.usage.cache_write_tokens,
                    cost_usd: record.cost_usd,
                },
            )
            .await
            .map_err(|e| PersistenceError(e.to_string()))?;
        }
        tracing::info!(
            run_id = self.run.id,
            entries = records.len(),
            "Inserted cost entries",
        );
        Ok(())
    }
}

/// Step-name string to enum mapping for rehydrating bulk-inserted rows.
const STEP_BY_NAME: &[(&str, StepName)] = &[
    ("load_account_config", StepName::LoadAccountConfig),
    ("generate_prompt", StepName::GeneratePrompt),
    ("determine_version", StepName::DetermineVersion),
    ("create_injection_file", StepName::CreateInjectionFile),
    ("save_prompt_version", StepName::SavePromptVersion),
    ("log_costs", StepName::LogCosts),
];

#[cfg(test)]
mod tests {
    use super::*;
    use promptforge_core::steps::STEP_SEQUENCE;

    #[test]
    fn step_name_mapping_covers_the_sequence() {
        for step in STEP_SEQUENCE {
            let found = STEP_BY_NAME
                .iter()
                .any(|(name, s)| s == step && *name == step.as_str());
            assert!(found, "missing mapping for {:?}", step);
        }
        assert_eq!(STEP_BY_NAME.len(), STEP_SEQUENCE.len());
    }
}

//! Pipeline orchestrator.
//!
//! Drives the fixed step sequence for one run: load account config,
//! generate and refine the prompt, assign a version, package the
//! injection artifact, save the version row, flush the cost ledger.
//! Failure classes come from the declarative policy table in
//! `core::steps`; the first Fatal failure aborts the run, NonFatal
//! failures are recorded on the step and skipped past.

use std::time::Instant;

use promptforge_completion::provider::CompletionProvider;
use promptforge_core::hashing::sha256_hex;
use promptforge_core::ledger::{CostRecord, SessionLedger};
use promptforge_core::packaging::{package, slugify, InjectionArtifact};
use promptforge_core::pricing::TokenUsage;
use promptforge_core::steps::{
    failure_class, FailureClass, RunStatus, StepName, StepStatus, STEP_SEQUENCE,
};
use promptforge_core::versioning::VersionLabel;
use promptforge_core::briefing::Briefing;
use promptforge_sheets::sink::{LedgerFlush, LedgerSink};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::context::{PromptVersionDraft, RunIdentity, RunPersistence, RunRecord};
use crate::costlog;
use crate::refine::{refine, IterationRecord};
use crate::registry::AccountRegistry;
use crate::runner::StepRunner;
use crate::version::next_version;

// ---------------------------------------------------------------------------
// Input and result types
// ---------------------------------------------------------------------------

/// Everything a caller supplies to start one run.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineInput {
    pub account_key: String,
    pub assistant_key: String,
    pub briefing: Briefing,
}

/// Final state of one step, as reported to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: StepName,
    pub status: StepStatus,
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Outcome of one pipeline run.
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub run_key: String,
    pub status: RunStatus,
    /// Message of the fatal failure, when the run failed.
    pub error: Option<String>,
    pub steps: Vec<StepReport>,
    /// Final refined prompt text. `None` when the run failed.
    pub generated_prompt: Option<String>,
    pub iterations: Vec<IterationRecord>,
    pub version: Option<VersionLabel>,
    /// Packaged injection artifact. `None` when the run failed.
    pub injection: Option<InjectionArtifact>,
    pub cost_records: Vec<CostRecord>,
    pub totals: TokenUsage,
    pub total_cost_usd: f64,
    pub duration_ms: u64,
}

// ---------------------------------------------------------------------------
// Step outcome bookkeeping
// ---------------------------------------------------------------------------

/// Result of executing one step's body.
enum StepOutcome {
    Ok,
    NonFatal(String),
    Fatal(String),
}

/// Per-run mutable bookkeeping: step reports plus durable mirroring.
struct RunState {
    reports: Vec<StepReport>,
    record: Option<Box<dyn RunRecord>>,
}

impl RunState {
    fn new() -> Self {
        let reports = STEP_SEQUENCE
            .iter()
            .map(|s| StepReport {
                step: *s,
                status: StepStatus::Pending,
                error: None,
                duration_ms: 0,
            })
            .collect();
        Self {
            reports,
            record: None,
        }
    }

    fn report_mut(&mut self, step: StepName) -> &mut StepReport {
        let idx = (step.order() - 1) as usize;
        &mut self.reports[idx]
    }

    async fn begin(&mut self, step: StepName) {
        tracing::info!(step = step.as_str(), "Step started");
        self.report_mut(step).status = StepStatus::Running;
        if let Some(record) = &self.record {
            record.step_started(step).await;
        }
    }

    /// Record a step's outcome; returns the fatal message when the run
    /// must abort.
    async fn finish(
        &mut self,
        step: StepName,
        outcome: StepOutcome,
        started: Instant,
    ) -> Option<String> {
        let duration_ms = started.elapsed().as_millis() as u64;
        match outcome {
            StepOutcome::Ok => {
                let report = self.report_mut(step);
                report.status = StepStatus::Completed;
                report.duration_ms = duration_ms;
                if let Some(record) = &self.record {
                    record.step_completed(step).await;
                }
                tracing::info!(step = step.as_str(), duration_ms, "Step completed");
                None
            }
            StepOutcome::NonFatal(message) => {
                debug_assert_eq!(failure_class(step), FailureClass::NonFatal);
                let report = self.report_mut(step);
                report.status = StepStatus::Failed;
                report.error = Some(message.clone());
                report.duration_ms = duration_ms;
                if let Some(record) = &self.record {
                    record.step_failed(step, &message).await;
                }
                tracing::warn!(step = step.as_str(), error = %message, "Step failed, continuing");
                None
            }
            StepOutcome::Fatal(message) => {
                debug_assert_eq!(failure_class(step), FailureClass::Fatal);
                let report = self.report_mut(step);
                report.status = StepStatus::Failed;
                report.error = Some(message.clone());
                report.duration_ms = duration_ms;
                if let Some(record) = &self.record {
                    record.step_failed(step, &message).await;
                }
                tracing::error!(step = step.as_str(), error = %message, "Step failed, aborting run");
                Some(message)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Execute one pipeline run end to end.
///
/// Never returns an error: every failure mode is folded into the
/// returned [`PipelineResult`], whose `status`, `error`, and `steps`
/// pinpoint what happened.
pub async fn run_pipeline(
    config: &PipelineConfig,
    registry: &dyn AccountRegistry,
    provider: &dyn CompletionProvider,
    persistence: Option<&dyn RunPersistence>,
    sink: Option<&dyn LedgerSink>,
    input: PipelineInput,
) -> PipelineResult {
    let run_key = format!("pipeline_{}", Uuid::new_v4().simple());
    let run_started = Instant::now();

    let mut ledger = SessionLedger::new();
    ledger.reset();
    let mut state = RunState::new();

    tracing::info!(
        %run_key,
        account_key = %input.account_key,
        assistant_key = %input.assistant_key,
        briefing_id = %input.briefing.briefing_id,
        "Pipeline run started",
    );

    // Durable state attaches before the first step; a run that fails
    // immediately still gets its run and step rows marked failed.
    if let Some(persistence) = persistence {
        state.record = persistence
            .begin_run(&RunIdentity {
                run_key: run_key.clone(),
                account_key: input.account_key.clone(),
                assistant_key: input.assistant_key.clone(),
                briefing_id: input.briefing.briefing_id.clone(),
            })
            .await;
    }

    // ---- LoadAccountConfig (fatal) ----

    let step_started = Instant::now();
    state.begin(StepName::LoadAccountConfig).await;
    let account_config = match load_account_config(registry, &input).await {
        Ok(cfg) => cfg,
        Err(message) => {
            let error = state
                .finish(StepName::LoadAccountConfig, StepOutcome::Fatal(message), step_started)
                .await;
            return failed_result(run_key, error, state, &ledger, run_started).await;
        }
    };
    state
        .finish(StepName::LoadAccountConfig, StepOutcome::Ok, step_started)
        .await;

    // ---- GeneratePrompt (fatal) ----

    let step_started = Instant::now();
    state.begin(StepName::GeneratePrompt).await;
    let briefing_text = input.briefing.render();
    let briefing_hash = input.briefing.content_hash();
    let model = account_config.model.as_deref().unwrap_or(&config.model);
    let runner = StepRunner::new(provider, model.to_string(), config.max_tokens);

    let prompt = match refine(&runner, &briefing_text, config.max_iterations, &mut ledger).await {
        Ok(p) => p,
        Err(e) => {
            let message = format!("prompt generation failed: {e}");
            let error = state
                .finish(StepName::GeneratePrompt, StepOutcome::Fatal(message), step_started)
                .await;
            return failed_result(run_key, error, state, &ledger, run_started).await;
        }
    };
    state
        .finish(StepName::GeneratePrompt, StepOutcome::Ok, step_started)
        .await;

    // ---- DetermineVersion (non-fatal, internal fallback) ----

    let step_started = Instant::now();
    state.begin(StepName::DetermineVersion).await;
    let version = next_version(state.record.as_deref()).await;
    state
        .finish(StepName::DetermineVersion, StepOutcome::Ok, step_started)
        .await;

    // ---- CreateInjectionFile (non-fatal, pure) ----

    let step_started = Instant::now();
    state.begin(StepName::CreateInjectionFile).await;
    let slug = slugify(&input.briefing.business_name);
    let artifact = package(&prompt.content, &slug, &version, &briefing_hash);
    state
        .finish(StepName::CreateInjectionFile, StepOutcome::Ok, step_started)
        .await;

    // ---- SavePromptVersion (non-fatal) ----

    let step_started = Instant::now();
    state.begin(StepName::SavePromptVersion).await;
    let prompt_hash = sha256_hex(prompt.content.as_bytes());
    let draft = PromptVersionDraft {
        version: version.version.clone(),
        version_number: version.version_number,
        prompt_content: prompt.content.clone(),
        prompt_hash: prompt_hash.clone(),
        injection_content: artifact.content.clone(),
        briefing_hash: briefing_hash.clone(),
        total_iterations: prompt.iterations.len() as i32,
    };
    let outcome = save_prompt_version(state.record.as_deref(), &draft).await;
    state
        .finish(StepName::SavePromptVersion, outcome, step_started)
        .await;

    // ---- LogCosts (non-fatal) ----

    let step_started = Instant::now();
    state.begin(StepName::LogCosts).await;
    let flush = LedgerFlush {
        run_key: run_key.clone(),
        account_key: input.account_key.clone(),
        assistant_key: input.assistant_key.clone(),
        records: ledger.records().to_vec(),
        version: Some(version.version.clone()),
        total_iterations: prompt.iterations.len() as i32,
        prompt_hash: Some(prompt_hash),
        totals: *ledger.totals(),
        total_cost_usd: ledger.total_cost_usd(),
    };
    let outcome = match costlog::log_costs(state.record.as_deref(), sink, &flush).await {
        Ok(()) => StepOutcome::Ok,
        Err(e) => StepOutcome::NonFatal(e.to_string()),
    };
    state.finish(StepName::LogCosts, outcome, step_started).await;

    // ---- Terminal state ----

    let duration_ms = run_started.elapsed().as_millis() as u64;
    if let Some(record) = &state.record {
        record.run_completed(duration_ms as i64).await;
    }
    tracing::info!(
        %run_key,
        duration_ms,
        total_cost_usd = ledger.total_cost_usd(),
        version = %version.version,
        "Pipeline run completed",
    );

    PipelineResult {
        run_key,
        status: RunStatus::Completed,
        error: None,
        steps: state.reports,
        generated_prompt: Some(prompt.content),
        iterations: prompt.iterations,
        version: Some(version),
        injection: Some(artifact),
        cost_records: ledger.records().to_vec(),
        totals: *ledger.totals(),
        total_cost_usd: ledger.total_cost_usd(),
        duration_ms,
    }
}

// ---------------------------------------------------------------------------
// Step bodies
// ---------------------------------------------------------------------------

/// Validate the briefing and resolve the account; any failure message
/// here is fatal.
async fn load_account_config(
    registry: &dyn AccountRegistry,
    input: &PipelineInput,
) -> Result<crate::registry::AccountConfig, String> {
    input
        .briefing
        .check()
        .map_err(|e| format!("briefing rejected: {e}"))?;

    let check = registry.validate_credentials();
    if !check.valid {
        return Err(check
            .error
            .unwrap_or_else(|| "provider credentials invalid".to_string()));
    }

    registry
        .load_account_config(&input.account_key)
        .await
        .ok_or_else(|| format!("unknown account: {}", input.account_key))
}

/// Insert the prompt version row. Without durable state the artifact
/// only exists in the result, which local-only callers accept.
async fn save_prompt_version(
    record: Option<&dyn RunRecord>,
    draft: &PromptVersionDraft,
) -> StepOutcome {
    let Some(record) = record else {
        tracing::warn!("No durable run record, prompt version not saved durably");
        return StepOutcome::Ok;
    };

    match record.save_prompt_version(draft).await {
        Ok(()) => StepOutcome::Ok,
        Err(e) => StepOutcome::NonFatal(format!("prompt version insert failed: {e}")),
    }
}

/// Build the failure result and mark the run row failed.
async fn failed_result(
    run_key: String,
    error: Option<String>,
    state: RunState,
    ledger: &SessionLedger,
    run_started: Instant,
) -> PipelineResult {
    let duration_ms = run_started.elapsed().as_millis() as u64;
    if let Some(record) = &state.record {
        record
            .run_failed(
                duration_ms as i64,
                error.as_deref().unwrap_or("pipeline failed"),
            )
            .await;
    }
    tracing::error!(
        %run_key,
        duration_ms,
        error = error.as_deref().unwrap_or("pipeline failed"),
        "Pipeline run failed",
    );

    PipelineResult {
        run_key,
        status: RunStatus::Failed,
        error,
        steps: state.reports,
        generated_prompt: None,
        iterations: Vec::new(),
        version: None,
        injection: None,
        cost_records: ledger.records().to_vec(),
        totals: *ledger.totals(),
        total_cost_usd: ledger.total_cost_usd(),
        duration_ms,
    }
}

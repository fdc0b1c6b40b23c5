//! Orchestrator integration tests against scripted stubs.
//!
//! No database and no network: the provider, registry, and spreadsheet
//! sink are all in-process stubs, which is exactly the seam the engine
//! exposes for them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use async_trait::async_trait;
use promptforge_completion::api::{CompletionApiError, CompletionRequest};
use promptforge_completion::provider::{Completion, CompletionProvider};
use promptforge_core::briefing::Briefing;
use promptforge_core::ledger::{CostRecord, Operation};
use promptforge_core::pricing::TokenUsage;
use promptforge_core::steps::{RunStatus, StepName, StepStatus};
use promptforge_pipeline::{
    run_pipeline, AccountConfig, AccountRegistry, CredentialCheck, PersistenceError,
    PipelineConfig, PipelineInput, PromptVersionDraft, RunIdentity, RunPersistence, RunRecord,
};
use promptforge_sheets::api::SheetsApiError;
use promptforge_sheets::sink::{LedgerFlush, LedgerSink};

// ---------------------------------------------------------------------------
// Stubs
// ---------------------------------------------------------------------------

/// Provider that always succeeds with a fixed 100/50 token usage.
struct ScriptedProvider {
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(
        &self,
        _request: &CompletionRequest,
    ) -> Result<Completion, CompletionApiError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Completion {
            text: format!("response {n}"),
            usage: TokenUsage {
                input_tokens: 100,
                output_tokens: 50,
                ..Default::default()
            },
            stop_reason: Some("end_turn".to_string()),
            model: "claude-sonnet-4-5".to_string(),
        })
    }
}

/// Provider whose every call fails.
struct FailingProvider;

#[async_trait]
impl CompletionProvider for FailingProvider {
    async fn complete(
        &self,
        _request: &CompletionRequest,
    ) -> Result<Completion, CompletionApiError> {
        Err(CompletionApiError::ApiError {
            status: 500,
            body: "provider down".to_string(),
        })
    }
}

/// Registry with scriptable account existence and credential state.
struct StubRegistry {
    account_known: bool,
    credentials_ok: bool,
}

impl StubRegistry {
    fn ok() -> Self {
        Self {
            account_known: true,
            credentials_ok: true,
        }
    }
}

#[async_trait]
impl AccountRegistry for StubRegistry {
    async fn load_account_config(&self, account_key: &str) -> Option<AccountConfig> {
        self.account_known.then(|| AccountConfig {
            account_key: account_key.to_string(),
            display_name: "Acme Coffee".to_string(),
            model: None,
        })
    }

    fn validate_credentials(&self) -> CredentialCheck {
        if self.credentials_ok {
            CredentialCheck::ok()
        } else {
            CredentialCheck::invalid("no credential configured")
        }
    }
}

/// Spreadsheet sink whose flush always fails.
struct FailingSink;

#[async_trait]
impl LedgerSink for FailingSink {
    async fn flush(&self, _flush: &LedgerFlush) -> Result<(), SheetsApiError> {
        Err(SheetsApiError::ApiError {
            status: 500,
            body: "quota exceeded".to_string(),
        })
    }
}

/// Durable store stub that logs every call it receives, with an
/// optionally failing version save.
struct RecordingPersistence {
    calls: Arc<Mutex<Vec<String>>>,
    fail_version_save: bool,
}

impl RecordingPersistence {
    fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_version_save: false,
        }
    }

    fn failing_version_save() -> Self {
        Self {
            fail_version_save: true,
            ..Self::new()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RunPersistence for RecordingPersistence {
    async fn begin_run(&self, identity: &RunIdentity) -> Option<Box<dyn RunRecord>> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("begin_run {}", identity.account_key));
        Some(Box::new(RecordingRecord {
            calls: self.calls.clone(),
            fail_version_save: self.fail_version_save,
        }))
    }
}

struct RecordingRecord {
    calls: Arc<Mutex<Vec<String>>>,
    fail_version_save: bool,
}

impl RecordingRecord {
    fn push(&self, event: String) {
        self.calls.lock().unwrap().push(event);
    }
}

#[async_trait]
impl RunRecord for RecordingRecord {
    async fn step_started(&self, step: StepName) {
        self.push(format!("step_started {}", step.as_str()));
    }

    async fn step_completed(&self, step: StepName) {
        self.push(format!("step_completed {}", step.as_str()));
    }

    async fn step_failed(&self, step: StepName, message: &str) {
        self.push(format!("step_failed {} {message}", step.as_str()));
    }

    async fn run_completed(&self, _duration_ms: i64) {
        self.push("run_completed".to_string());
    }

    async fn run_failed(&self, _duration_ms: i64, message: &str) {
        self.push(format!("run_failed {message}"));
    }

    async fn next_version_number(&self) -> Result<i32, PersistenceError> {
        Ok(4)
    }

    async fn save_prompt_version(
        &self,
        draft: &PromptVersionDraft,
    ) -> Result<(), PersistenceError> {
        if self.fail_version_save {
            return Err(PersistenceError("duplicate version_number".to_string()));
        }
        self.push(format!("save_prompt_version {}", draft.version));
        Ok(())
    }

    async fn record_costs(&self, records: &[CostRecord]) -> Result<(), PersistenceError> {
        self.push(format!("record_costs {}", records.len()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn briefing() -> Briefing {
    Briefing {
        briefing_id: "brief-1".to_string(),
        business_name: "Acme Coffee".to_string(),
        business_description: "Specialty coffee roaster and cafe.".to_string(),
        assistant_role: "Customer support assistant".to_string(),
        target_audience: "Coffee lovers".to_string(),
        tone_of_voice: "Warm and concise".to_string(),
        goals: vec!["Answer product questions".to_string()],
        key_information: vec!["Open 8-18 weekdays".to_string()],
        constraints: vec!["Never discuss competitors".to_string()],
    }
}

fn input() -> PipelineInput {
    PipelineInput {
        account_key: "acct-1".to_string(),
        assistant_key: "asst-1".to_string(),
        briefing: briefing(),
    }
}

fn config(max_iterations: u32) -> PipelineConfig {
    PipelineConfig {
        max_iterations,
        ..Default::default()
    }
}

fn step_status(result: &promptforge_pipeline::PipelineResult, step: StepName) -> StepStatus {
    result
        .steps
        .iter()
        .find(|r| r.step == step)
        .map(|r| r.status)
        .unwrap_or(StepStatus::Pending)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn single_iteration_run_completes_with_three_cost_records() {
    let provider = ScriptedProvider::new();
    let result = run_pipeline(
        &config(1),
        &StubRegistry::ok(),
        &provider,
        None,
        None,
        input(),
    )
    .await;

    assert_eq!(result.status, RunStatus::Completed);
    assert!(result.error.is_none());
    assert_eq!(provider.call_count(), 3);

    let ops: Vec<Operation> = result.cost_records.iter().map(|r| r.operation).collect();
    assert_eq!(
        ops,
        vec![
            Operation::Generation,
            Operation::Analysis,
            Operation::Improvement
        ]
    );
    assert_eq!(result.totals.input_tokens, 300);
    assert_eq!(result.totals.output_tokens, 150);
    assert_eq!(result.iterations.len(), 1);
    assert_eq!(result.iterations[0].iteration_number, 1);

    // The final prompt is the improvement output, the third call.
    assert_eq!(result.generated_prompt.as_deref(), Some("response 3"));
}

#[tokio::test]
async fn zero_iterations_returns_initial_generation() {
    let provider = ScriptedProvider::new();
    let result = run_pipeline(
        &config(0),
        &StubRegistry::ok(),
        &provider,
        None,
        None,
        input(),
    )
    .await;

    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(provider.call_count(), 1);
    assert_eq!(result.cost_records.len(), 1);
    assert_eq!(result.cost_records[0].operation, Operation::Generation);
    assert!(result.iterations.is_empty());
    assert_eq!(result.generated_prompt.as_deref(), Some("response 1"));
}

#[tokio::test]
async fn k_iterations_make_one_plus_two_k_calls() {
    let provider = ScriptedProvider::new();
    let result = run_pipeline(
        &config(3),
        &StubRegistry::ok(),
        &provider,
        None,
        None,
        input(),
    )
    .await;

    assert_eq!(provider.call_count(), 7);
    assert_eq!(result.cost_records.len(), 7);

    let numbers: Vec<i32> = result
        .iterations
        .iter()
        .map(|i| i.iteration_number)
        .collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[tokio::test]
async fn provider_failure_during_generation_is_fatal() {
    let result = run_pipeline(
        &config(1),
        &StubRegistry::ok(),
        &FailingProvider,
        None,
        None,
        input(),
    )
    .await;

    assert_matches!(result.status, RunStatus::Failed);
    let error = result.error.as_deref().unwrap();
    assert!(error.contains("prompt generation failed"), "{error}");
    assert!(result.generated_prompt.is_none());
    assert!(result.injection.is_none());
    assert!(result.version.is_none());

    assert_eq!(
        step_status(&result, StepName::GeneratePrompt),
        StepStatus::Failed
    );
    assert_eq!(
        step_status(&result, StepName::DetermineVersion),
        StepStatus::Pending
    );
    assert_eq!(step_status(&result, StepName::LogCosts), StepStatus::Pending);
}

#[tokio::test]
async fn failing_sink_is_confined_to_log_costs_step() {
    let provider = ScriptedProvider::new();
    let result = run_pipeline(
        &config(1),
        &StubRegistry::ok(),
        &provider,
        None,
        Some(&FailingSink),
        input(),
    )
    .await;

    assert_eq!(result.status, RunStatus::Completed);
    assert!(result.generated_prompt.is_some());
    assert!(result.injection.is_some());

    let log_costs = result
        .steps
        .iter()
        .find(|r| r.step == StepName::LogCosts)
        .unwrap();
    assert_eq!(log_costs.status, StepStatus::Failed);
    assert!(log_costs
        .error
        .as_deref()
        .unwrap()
        .contains("spreadsheet flush failed"));

    for step in [
        StepName::LoadAccountConfig,
        StepName::GeneratePrompt,
        StepName::DetermineVersion,
        StepName::CreateInjectionFile,
        StepName::SavePromptVersion,
    ] {
        assert_eq!(step_status(&result, step), StepStatus::Completed);
    }
}

#[tokio::test]
async fn unknown_account_is_fatal() {
    let registry = StubRegistry {
        account_known: false,
        credentials_ok: true,
    };
    let result = run_pipeline(
        &config(1),
        &registry,
        &ScriptedProvider::new(),
        None,
        None,
        input(),
    )
    .await;

    assert_matches!(result.status, RunStatus::Failed);
    assert!(result.error.as_deref().unwrap().contains("unknown account"));
    assert_eq!(
        step_status(&result, StepName::LoadAccountConfig),
        StepStatus::Failed
    );
    assert!(result.cost_records.is_empty());
}

#[tokio::test]
async fn invalid_credentials_are_fatal() {
    let registry = StubRegistry {
        account_known: true,
        credentials_ok: false,
    };
    let result = run_pipeline(
        &config(1),
        &registry,
        &ScriptedProvider::new(),
        None,
        None,
        input(),
    )
    .await;

    assert_eq!(result.status, RunStatus::Failed);
    assert!(result
        .error
        .as_deref()
        .unwrap()
        .contains("no credential configured"));
}

#[tokio::test]
async fn invalid_briefing_is_rejected_before_any_provider_call() {
    let provider = ScriptedProvider::new();
    let mut bad_input = input();
    bad_input.briefing.business_name = String::new();

    let result = run_pipeline(
        &config(1),
        &StubRegistry::ok(),
        &provider,
        None,
        None,
        bad_input,
    )
    .await;

    assert_eq!(result.status, RunStatus::Failed);
    assert!(result.error.as_deref().unwrap().contains("briefing rejected"));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn result_cost_summary_matches_its_records() {
    let result = run_pipeline(
        &config(2),
        &StubRegistry::ok(),
        &ScriptedProvider::new(),
        None,
        None,
        input(),
    )
    .await;

    let sum: f64 = result.cost_records.iter().map(|r| r.cost_usd).sum();
    assert!((result.total_cost_usd - sum).abs() < 1e-12);

    let input_sum: i64 = result
        .cost_records
        .iter()
        .map(|r| r.usage.input_tokens)
        .sum();
    assert_eq!(result.totals.input_tokens, input_sum);
}

#[tokio::test]
async fn failed_version_save_is_confined_to_its_step() {
    let persistence = RecordingPersistence::failing_version_save();
    let result = run_pipeline(
        &config(1),
        &StubRegistry::ok(),
        &ScriptedProvider::new(),
        Some(&persistence),
        None,
        input(),
    )
    .await;

    assert_eq!(result.status, RunStatus::Completed);
    assert!(result.generated_prompt.is_some());
    assert!(result.injection.is_some());

    let save = result
        .steps
        .iter()
        .find(|r| r.step == StepName::SavePromptVersion)
        .unwrap();
    assert_eq!(save.status, StepStatus::Failed);
    assert!(save
        .error
        .as_deref()
        .unwrap()
        .contains("prompt version insert failed"));

    for step in [
        StepName::LoadAccountConfig,
        StepName::GeneratePrompt,
        StepName::DetermineVersion,
        StepName::CreateInjectionFile,
        StepName::LogCosts,
    ] {
        assert_eq!(step_status(&result, step), StepStatus::Completed);
    }

    // Cost entries still reach the relational sink.
    let calls = persistence.calls();
    assert!(calls.iter().any(|c| c == "record_costs 3"), "{calls:?}");
    assert!(calls.iter().any(|c| c == "run_completed"), "{calls:?}");
}

#[tokio::test]
async fn fatal_first_step_still_marks_the_durable_run_failed() {
    let persistence = RecordingPersistence::new();
    let registry = StubRegistry {
        account_known: true,
        credentials_ok: false,
    };
    let result = run_pipeline(
        &config(1),
        &registry,
        &ScriptedProvider::new(),
        Some(&persistence),
        None,
        input(),
    )
    .await;

    assert_eq!(result.status, RunStatus::Failed);

    // Durable state attaches before the first step, so the failure is
    // mirrored even though no step ever completed.
    let calls = persistence.calls();
    assert_eq!(calls.first().map(String::as_str), Some("begin_run acct-1"));
    assert!(
        calls.iter().any(|c| c == "step_started load_account_config"),
        "{calls:?}"
    );
    assert!(
        calls
            .iter()
            .any(|c| c.starts_with("step_failed load_account_config")),
        "{calls:?}"
    );
    assert!(calls.iter().any(|c| c.starts_with("run_failed")), "{calls:?}");
    assert!(!calls.iter().any(|c| c == "run_completed"), "{calls:?}");
}

#[tokio::test]
async fn version_comes_from_the_durable_counter() {
    let persistence = RecordingPersistence::new();
    let result = run_pipeline(
        &config(0),
        &StubRegistry::ok(),
        &ScriptedProvider::new(),
        Some(&persistence),
        None,
        input(),
    )
    .await;

    let version = result.version.as_ref().unwrap();
    assert_eq!(version.version, "v4");
    assert_eq!(version.version_number, 4);

    let injection = result.injection.as_ref().unwrap();
    assert_eq!(injection.file_name, "acme-coffee_v4.prompt.md");

    let calls = persistence.calls();
    assert!(
        calls.iter().any(|c| c == "save_prompt_version v4"),
        "{calls:?}"
    );
}

#[tokio::test]
async fn version_falls_back_to_v1_without_persistence() {
    let result = run_pipeline(
        &config(0),
        &StubRegistry::ok(),
        &ScriptedProvider::new(),
        None,
        None,
        input(),
    )
    .await;

    let version = result.version.as_ref().unwrap();
    assert_eq!(version.version, "v1");
    assert_eq!(version.version_number, 1);

    let injection = result.injection.as_ref().unwrap();
    assert_eq!(injection.file_name, "acme-coffee_v1.prompt.md");
    assert!(injection.content.contains("version: v1"));
}

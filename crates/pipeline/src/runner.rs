//! Completion step runner.
//!
//! One method per billable operation. Every call follows the same
//! shape: build the request, hit the provider, price the reported
//! usage, record it in the session ledger under the operation tag.

use promptforge_completion::api::{CompletionApiError, CompletionRequest};
use promptforge_completion::provider::{Completion, CompletionProvider};
use promptforge_core::ledger::{CostRecord, Operation, SessionLedger};
use promptforge_core::pricing::cost_for;

use crate::prompts;

/// Executes individual provider calls for one run.
pub struct StepRunner<'a> {
    provider: &'a dyn CompletionProvider,
    model: String,
    max_tokens: i64,
}

impl<'a> StepRunner<'a> {
    pub fn new(provider: &'a dyn CompletionProvider, model: String, max_tokens: i64) -> Self {
        Self {
            provider,
            model,
            max_tokens,
        }
    }

    /// Generate the initial prompt from a rendered briefing.
    pub async fn generate(
        &self,
        briefing_text: &str,
        ledger: &mut SessionLedger,
    ) -> Result<Completion, CompletionApiError> {
        let request = prompts::generate_request(briefing_text, &self.model, self.max_tokens);
        self.call(&request, Operation::Generation, ledger).await
    }

    /// Critique the current prompt draft against the briefing.
    pub async fn analyze(
        &self,
        prompt: &str,
        briefing_text: &str,
        ledger: &mut SessionLedger,
    ) -> Result<Completion, CompletionApiError> {
        let request =
            prompts::analyze_request(prompt, briefing_text, &self.model, self.max_tokens);
        self.call(&request, Operation::Analysis, ledger).await
    }

    /// Rewrite the draft applying review feedback.
    pub async fn improve(
        &self,
        prompt: &str,
        feedback: &str,
        briefing_text: &str,
        ledger: &mut SessionLedger,
    ) -> Result<Completion, CompletionApiError> {
        let request = prompts::improve_request(
            prompt,
            feedback,
            briefing_text,
            &self.model,
            self.max_tokens,
        );
        self.call(&request, Operation::Improvement, ledger).await
    }

    // ---- private helpers ----

    async fn call(
        &self,
        request: &CompletionRequest,
        operation: Operation,
        ledger: &mut SessionLedger,
    ) -> Result<Completion, CompletionApiError> {
        let completion = self.provider.complete(request).await?;
        let cost = cost_for(&completion.usage, &completion.model);

        tracing::debug!(
            operation = operation.as_str(),
            model = %completion.model,
            input_tokens = completion.usage.input_tokens,
            output_tokens = completion.usage.output_tokens,
            cost_usd = cost.total_cost_usd,
            "Recorded operation cost",
        );

        ledger.record(CostRecord {
            operation,
            model: completion.model.clone(),
            usage: completion.usage,
            cost_usd: cost.total_cost_usd,
            recorded_at: chrono::Utc::now(),
        });
        Ok(completion)
    }
}

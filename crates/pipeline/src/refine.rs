//! Iterative prompt refinement loop.
//!
//! One generation, then a fixed number of analyze/improve rounds. The
//! round count is configuration, not convergence: every configured
//! round runs even if a draft stops changing.

use promptforge_completion::api::CompletionApiError;
use promptforge_core::ledger::SessionLedger;
use promptforge_core::types::Timestamp;
use serde::Serialize;

use crate::runner::StepRunner;

/// One completed analyze/improve round.
#[derive(Debug, Clone, Serialize)]
pub struct IterationRecord {
    /// 1-based round number.
    pub iteration_number: i32,
    /// Review feedback produced by the analysis call.
    pub feedback: String,
    /// Prompt text as it stood after this round's improvement.
    pub prompt_snapshot: String,
    pub recorded_at: Timestamp,
}

/// Output of the refinement loop.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPrompt {
    /// Final prompt text after all rounds.
    pub content: String,
    /// All completed rounds, in order. Empty when no rounds ran.
    pub iterations: Vec<IterationRecord>,
}

/// Generate a prompt and refine it for `max_iterations` rounds.
///
/// Any provider failure aborts the loop and propagates; partial work is
/// already priced into the ledger by the step runner.
pub async fn refine(
    runner: &StepRunner<'_>,
    briefing_text: &str,
    max_iterations: u32,
    ledger: &mut SessionLedger,
) -> Result<GeneratedPrompt, CompletionApiError> {
    let generation = runner.generate(briefing_text, ledger).await?;
    let mut content = generation.text;
    let mut iterations = Vec::with_capacity(max_iterations as usize);

    for round in 1..=max_iterations {
        let analysis = runner.analyze(&content, briefing_text, ledger).await?;
        let improved = runner
            .improve(&content, &analysis.text, briefing_text, ledger)
            .await?;
        content = improved.text;

        tracing::info!(
            iteration = round,
            prompt_chars = content.len(),
            "Refinement round finished",
        );

        iterations.push(IterationRecord {
            iteration_number: round as i32,
            feedback: analysis.text,
            prompt_snapshot: content.clone(),
            recorded_at: chrono::Utc::now(),
        });
    }

    Ok(GeneratedPrompt {
        content,
        iterations,
    })
}

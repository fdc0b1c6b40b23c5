//! Pipeline step and run status vocabulary.
//!
//! Every status literal is a named enum variant, no magic strings in
//! orchestrator or repository code. The failure-class policy for each
//! step lives here as a single declarative mapping so the orchestrator
//! does not scatter fatal/non-fatal decisions across catch sites.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Step names
// ---------------------------------------------------------------------------

/// The named phases of a pipeline run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    LoadAccountConfig,
    GeneratePrompt,
    DetermineVersion,
    CreateInjectionFile,
    SavePromptVersion,
    LogCosts,
}

/// The fixed step sequence every run executes.
pub const STEP_SEQUENCE: &[StepName] = &[
    StepName::LoadAccountConfig,
    StepName::GeneratePrompt,
    StepName::DetermineVersion,
    StepName::CreateInjectionFile,
    StepName::SavePromptVersion,
    StepName::LogCosts,
];

impl StepName {
    /// Stable string form used in `pipeline_steps.step_name`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LoadAccountConfig => "load_account_config",
            Self::GeneratePrompt => "generate_prompt",
            Self::DetermineVersion => "determine_version",
            Self::CreateInjectionFile => "create_injection_file",
            Self::SavePromptVersion => "save_prompt_version",
            Self::LogCosts => "log_costs",
        }
    }

    /// 1-based position of this step in [`STEP_SEQUENCE`].
    pub fn order(self) -> i32 {
        STEP_SEQUENCE
            .iter()
            .position(|s| *s == self)
            .map(|i| i as i32 + 1)
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Statuses
// ---------------------------------------------------------------------------

/// Status of one step within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl StepStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Terminal-or-running status of a whole pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

// ---------------------------------------------------------------------------
// Failure policy
// ---------------------------------------------------------------------------

/// Whether a step's failure aborts the run or is recorded and skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Abort the run immediately with status `failed`.
    Fatal,
    /// Record the step as failed, keep the run going.
    NonFatal,
}

/// The failure-class policy table.
///
/// Generation success is the run's success criterion; everything after
/// it is best-effort persistence.
pub fn failure_class(step: StepName) -> FailureClass {
    match step {
        StepName::LoadAccountConfig | StepName::GeneratePrompt => FailureClass::Fatal,
        StepName::DetermineVersion
        | StepName::CreateInjectionFile
        | StepName::SavePromptVersion
        | StepName::LogCosts => FailureClass::NonFatal,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_has_six_steps_in_order() {
        assert_eq!(STEP_SEQUENCE.len(), 6);
        assert_eq!(STEP_SEQUENCE[0], StepName::LoadAccountConfig);
        assert_eq!(STEP_SEQUENCE[5], StepName::LogCosts);
    }

    #[test]
    fn step_order_is_one_based_and_increasing() {
        let orders: Vec<i32> = STEP_SEQUENCE.iter().map(|s| s.order()).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn account_and_generation_steps_are_fatal() {
        assert_eq!(
            failure_class(StepName::LoadAccountConfig),
            FailureClass::Fatal
        );
        assert_eq!(failure_class(StepName::GeneratePrompt), FailureClass::Fatal);
    }

    #[test]
    fn trailing_steps_are_non_fatal() {
        for step in [
            StepName::DetermineVersion,
            StepName::CreateInjectionFile,
            StepName::SavePromptVersion,
            StepName::LogCosts,
        ] {
            assert_eq!(failure_class(step), FailureClass::NonFatal);
        }
    }

    #[test]
    fn step_names_are_snake_case() {
        assert_eq!(StepName::LoadAccountConfig.as_str(), "load_account_config");
        assert_eq!(StepName::LogCosts.as_str(), "log_costs");
    }

    #[test]
    fn status_string_forms() {
        assert_eq!(StepStatus::Pending.as_str(), "pending");
        assert_eq!(StepStatus::Failed.as_str(), "failed");
        assert_eq!(RunStatus::Completed.as_str(), "completed");
    }
}

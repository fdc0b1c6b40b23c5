//! Error types shared by the pure-logic layer.

/// Errors raised by the domain core.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Input failed validation at intake.
    #[error("Validation failed: {0}")]
    Validation(String),
}

//! Version assignment for generated prompts.

use promptforge_core::versioning::{VersionLabel, FALLBACK_VERSION_NUMBER};

use crate::context::RunRecord;

/// Determine the next version label for the run's assistant.
///
/// Reads max(version_number) + 1 from the durable store when the run
/// has one. Without a record, or when the lookup fails, falls back to
/// version 1 with a warning. The read and the later insert are not one
/// transaction; concurrent runs can read the same number, and the
/// UNIQUE constraint on the insert turns that into a non-fatal save
/// failure instead of a silent duplicate.
pub async fn next_version(record: Option<&dyn RunRecord>) -> VersionLabel {
    let Some(record) = record else {
        tracing::warn!(
            fallback = FALLBACK_VERSION_NUMBER,
            "No durable run record, using fallback version number",
        );
        return VersionLabel::from_number(FALLBACK_VERSION_NUMBER);
    };

    match record.next_version_number().await {
        Ok(n) => VersionLabel::from_number(n),
        Err(e) => {
            tracing::warn!(
                error = %e,
                fallback = FALLBACK_VERSION_NUMBER,
                "Version lookup failed, using fallback version number",
            );
            VersionLabel::from_number(FALLBACK_VERSION_NUMBER)
        }
    }
}

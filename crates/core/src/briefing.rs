//! Briefing input model and rendering.
//!
//! A briefing is the caller-owned, immutable description of a business
//! and the assistant it wants. The engine only reads it: validation on
//! intake, rendering to the text block fed to the completion provider,
//! and hashing for provenance.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::hashing::sha256_hex;

/// Upper bound on free-text fields, matching the provider's practical
/// context budget for a single briefing.
pub const MAX_FIELD_CHARS: usize = 20_000;

/// Structured business briefing, as received from the caller.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct Briefing {
    #[validate(length(min = 1, max = 200))]
    pub briefing_id: String,

    #[validate(length(min = 1, max = 500))]
    pub business_name: String,

    #[validate(length(min = 1, max = 20_000))]
    pub business_description: String,

    /// What the assistant is for, in the business's own words.
    #[validate(length(min = 1, max = 20_000))]
    pub assistant_role: String,

    #[validate(length(max = 20_000))]
    #[serde(default)]
    pub target_audience: String,

    #[validate(length(max = 20_000))]
    #[serde(default)]
    pub tone_of_voice: String,

    /// Outcomes the assistant should drive toward.
    #[serde(default)]
    pub goals: Vec<String>,

    /// Product facts, pricing, and links the assistant may cite.
    #[serde(default)]
    pub key_information: Vec<String>,

    /// Topics and behaviors the assistant must avoid.
    #[serde(default)]
    pub constraints: Vec<String>,
}

impl Briefing {
    /// Validate field lengths and presence. Fatal at pipeline intake.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(format!("Invalid briefing: {e}")))
    }

    /// Render the briefing into the text block given to the provider.
    ///
    /// Sections are emitted in a fixed order so the same briefing always
    /// renders to the same text (and therefore the same hash).
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("BUSINESS: {}\n", self.business_name));
        out.push_str(&format!("DESCRIPTION:\n{}\n", self.business_description));
        out.push_str(&format!("\nASSISTANT ROLE:\n{}\n", self.assistant_role));

        if !self.target_audience.is_empty() {
            out.push_str(&format!("\nTARGET AUDIENCE:\n{}\n", self.target_audience));
        }
        if !self.tone_of_voice.is_empty() {
            out.push_str(&format!("\nTONE OF VOICE:\n{}\n", self.tone_of_voice));
        }
        push_list(&mut out, "GOALS", &self.goals);
        push_list(&mut out, "KEY INFORMATION", &self.key_information);
        push_list(&mut out, "CONSTRAINTS", &self.constraints);
        out
    }

    /// SHA-256 hex digest of the rendered briefing text.
    pub fn content_hash(&self) -> String {
        sha256_hex(self.render().as_bytes())
    }
}

fn push_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("\n{heading}:\n"));
    for item in items {
        out.push_str(&format!("- {item}\n"));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn briefing() -> Briefing {
        Briefing {
            briefing_id: "brief-1".to_string(),
            business_name: "Acme Coffee".to_string(),
            business_description: "Specialty coffee subscriptions.".to_string(),
            assistant_role: "Answer product questions and guide checkout.".to_string(),
            target_audience: "Home baristas".to_string(),
            tone_of_voice: "Warm, direct".to_string(),
            goals: vec!["Convert visitors".to_string()],
            key_information: vec!["Plans start at $18/month".to_string()],
            constraints: vec!["Never discuss competitors".to_string()],
        }
    }

    #[test]
    fn valid_briefing_passes_check() {
        assert!(briefing().check().is_ok());
    }

    #[test]
    fn empty_business_name_rejected() {
        let mut b = briefing();
        b.business_name = String::new();
        assert!(b.check().is_err());
    }

    #[test]
    fn oversized_description_rejected() {
        let mut b = briefing();
        b.business_description = "x".repeat(MAX_FIELD_CHARS + 1);
        assert!(b.check().is_err());
    }

    #[test]
    fn render_includes_all_populated_sections() {
        let text = briefing().render();
        assert!(text.contains("BUSINESS: Acme Coffee"));
        assert!(text.contains("ASSISTANT ROLE:"));
        assert!(text.contains("- Convert visitors"));
        assert!(text.contains("- Never discuss competitors"));
    }

    #[test]
    fn render_omits_empty_sections() {
        let mut b = briefing();
        b.goals.clear();
        b.tone_of_voice = String::new();
        let text = b.render();
        assert!(!text.contains("GOALS:"));
        assert!(!text.contains("TONE OF VOICE:"));
    }

    #[test]
    fn hash_is_stable_for_same_content() {
        assert_eq!(briefing().content_hash(), briefing().content_hash());
    }

    #[test]
    fn hash_changes_when_content_changes() {
        let mut b = briefing();
        let before = b.content_hash();
        b.goals.push("Upsell grinders".to_string());
        assert_ne!(before, b.content_hash());
    }
}

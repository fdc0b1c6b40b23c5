//! System instructions and request builders for the three operations.
//!
//! One builder per operation so the step runner stays free of string
//! assembly. The briefing text travels with every call so the provider
//! never analyzes a prompt without the business context it serves.

use promptforge_completion::api::{CompletionRequest, Message};

/// System instruction for the initial prompt generation call.
pub const GENERATE_SYSTEM: &str = "\
You are an expert prompt engineer. From the business briefing you are \
given, write a complete system prompt for a customer-facing AI assistant. \
The prompt must define the assistant's role, tone of voice, the goals it \
pursues, the facts it may cite, and the constraints it must respect. \
Output only the system prompt text, with no preamble or commentary.";

/// System instruction for the analysis call of a refinement round.
pub const ANALYZE_SYSTEM: &str = "\
You are an expert prompt reviewer. Critique the system prompt you are \
given against its business briefing: missing goals, tone mismatches, \
unstated constraints, factual gaps. Output a concise, actionable list of \
concrete improvements, nothing else.";

/// System instruction for the improvement call of a refinement round.
pub const IMPROVE_SYSTEM: &str = "\
You are an expert prompt engineer. Rewrite the system prompt you are \
given, applying every point of the review feedback while staying true to \
the business briefing. Output only the improved system prompt text, with \
no preamble or commentary.";

/// Build the generation request from a rendered briefing.
pub fn generate_request(briefing_text: &str, model: &str, max_tokens: i64) -> CompletionRequest {
    CompletionRequest {
        model: model.to_string(),
        max_tokens,
        system: Some(GENERATE_SYSTEM.to_string()),
        messages: vec![Message::user(format!(
            "Business briefing:\n\n{briefing_text}"
        ))],
    }
}

/// Build the analysis request for the current prompt draft.
pub fn analyze_request(
    prompt: &str,
    briefing_text: &str,
    model: &str,
    max_tokens: i64,
) -> CompletionRequest {
    CompletionRequest {
        model: model.to_string(),
        max_tokens,
        system: Some(ANALYZE_SYSTEM.to_string()),
        messages: vec![Message::user(format!(
            "Business briefing:\n\n{briefing_text}\n\n\
             System prompt under review:\n\n{prompt}"
        ))],
    }
}

/// Build the improvement request from the draft and review feedback.
pub fn improve_request(
    prompt: &str,
    feedback: &str,
    briefing_text: &str,
    model: &str,
    max_tokens: i64,
) -> CompletionRequest {
    CompletionRequest {
        model: model.to_string(),
        max_tokens,
        system: Some(IMPROVE_SYSTEM.to_string()),
        messages: vec![Message::user(format!(
            "Business briefing:\n\n{briefing_text}\n\n\
             Current system prompt:\n\n{prompt}\n\n\
             Review feedback:\n\n{feedback}"
        ))],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_request_carries_briefing() {
        let req = generate_request("We sell coffee.", "claude-sonnet-4-5", 1024);
        assert_eq!(req.model, "claude-sonnet-4-5");
        assert_eq!(req.max_tokens, 1024);
        assert_eq!(req.system.as_deref(), Some(GENERATE_SYSTEM));
        assert!(req.messages[0].content.contains("We sell coffee."));
    }

    #[test]
    fn analyze_request_carries_prompt_and_briefing() {
        let req = analyze_request("You are a barista.", "We sell coffee.", "m", 10);
        assert!(req.messages[0].content.contains("You are a barista."));
        assert!(req.messages[0].content.contains("We sell coffee."));
        assert_eq!(req.system.as_deref(), Some(ANALYZE_SYSTEM));
    }

    #[test]
    fn improve_request_carries_feedback() {
        let req = improve_request("draft", "add the tone section", "briefing", "m", 10);
        assert!(req.messages[0].content.contains("add the tone section"));
        assert_eq!(req.system.as_deref(), Some(IMPROVE_SYSTEM));
    }
}

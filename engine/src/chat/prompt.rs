//! Prompt text sent to the model

use sdk::FALLBACK_MESSAGE;
use crate::context::LoadedContext;
use serde_json::Value;

/// One-time instructions sent when a session is created.
pub fn initial_prompt(main_context: &Value) -> String {
    format!(
        r#"You are an intelligent assistant helping investors understand the company based on internal data.

You have access to the company's structure as described in the following context. Do not mention 'JSON', 'slides', or filenames to the user. Respond professionally and confidently as if you're part of Investor Relations.

If you cannot answer with the current data:
- Respond clearly that you need additional data.
- Specify the required file(s) by name in the format: Germany.json, UK.json, etc.
- Do not guess.

If you still can't answer after receiving additional data, respond with:
"{fallback}"

Company structure:
{context}"#,
        fallback = FALLBACK_MESSAGE,
        context = main_context,
    )
}

/// Follow-up turn carrying the supplementary documents the model asked for.
pub fn additional_context_prompt(requested: &[String], loaded: &LoadedContext) -> String {
    let context = serde_json::to_string(loaded).unwrap_or_else(|_| "{}".to_string());
    format!(
        "Here is additional context from {:?}:\n{}. \n Answer the question now",
        requested, context
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_initial_prompt_embeds_context_and_fallback() {
        let prompt = initial_prompt(&json!({"company": "Moove"}));
        assert!(prompt.contains(r#"{"company":"Moove"}"#));
        assert!(prompt.contains(FALLBACK_MESSAGE));
        assert!(prompt.contains("Germany.json"));
    }

    #[test]
    fn test_additional_context_prompt() {
        let loaded: LoadedContext = [("Germany".to_string(), json!({"headcount": 120}))]
            .into_iter()
            .collect();

        let prompt = additional_context_prompt(&["Germany".to_string()], &loaded);
        assert!(prompt.starts_with(r#"Here is additional context from ["Germany"]:"#));
        assert!(prompt.contains(r#"{"Germany":{"headcount":120}}"#));
        assert!(prompt.ends_with("Answer the question now"));
    }

    #[test]
    fn test_additional_context_prompt_keeps_request_order() {
        let loaded: LoadedContext = [
            ("UK".to_string(), json!({"headcount": 75})),
            ("Germany".to_string(), json!({"headcount": 120})),
        ]
        .into_iter()
        .collect();

        let requested = vec!["UK".to_string(), "Germany".to_string()];
        let prompt = additional_context_prompt(&requested, &loaded);
        assert!(prompt.contains(r#"{"UK":{"headcount":75},"Germany":{"headcount":120}}"#));
    }
}

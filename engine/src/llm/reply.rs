//! Structured model replies
//!
//! Sessions are configured so that every model turn is a JSON object of the
//! form `{"status": ..., "answer": ..., "requested_files": [...]}`. Decoding
//! is strict: a reply missing a field or carrying an unknown status is a
//! [`LLMError::SchemaMismatch`], never a partially filled value.

use super::{LLMError, OutputFormat, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

/// Outcome the model reports for a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    /// `answer` holds the reply for the user
    Answered,

    /// The model wants the files listed in `requested_files`
    NeedsMoreContext,

    /// The question cannot be answered from the available data
    NotFound,
}

impl ReplyStatus {
    pub const ALL: [ReplyStatus; 3] = [
        ReplyStatus::Answered,
        ReplyStatus::NeedsMoreContext,
        ReplyStatus::NotFound,
    ];

    /// Wire label of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyStatus::Answered => "answered",
            ReplyStatus::NeedsMoreContext => "needs_more_context",
            ReplyStatus::NotFound => "not_found",
        }
    }
}

impl fmt::Display for ReplyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded model reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmReply {
    pub status: ReplyStatus,
    pub answer: String,
    /// Only meaningful when `status` is `NeedsMoreContext`
    pub requested_files: Vec<String>,
}

impl LlmReply {
    /// Decode raw reply text.
    ///
    /// # Errors
    ///
    /// Returns `LLMError::SchemaMismatch` if `text` is not a JSON object with
    /// exactly the reply fields and a known status.
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text.trim()).map_err(|e| LLMError::SchemaMismatch(e.to_string()))
    }

    /// Response schema in the Gemini `responseSchema` dialect
    pub fn schema() -> serde_json::Value {
        let statuses: Vec<&str> = ReplyStatus::ALL.iter().map(ReplyStatus::as_str).collect();
        json!({
            "type": "OBJECT",
            "properties": {
                "status": { "type": "STRING", "enum": statuses },
                "answer": { "type": "STRING" },
                "requested_files": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" }
                }
            },
            "required": ["status", "answer", "requested_files"],
            "propertyOrdering": ["status", "answer", "requested_files"]
        })
    }

    /// Output format that makes the model produce an `LlmReply`
    pub fn output_format() -> OutputFormat {
        OutputFormat::json(Self::schema())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answered() {
        let reply =
            LlmReply::parse(r#"{"status": "answered", "answer": "120", "requested_files": []}"#)
                .unwrap();
        assert_eq!(reply.status, ReplyStatus::Answered);
        assert_eq!(reply.answer, "120");
        assert!(reply.requested_files.is_empty());
    }

    #[test]
    fn test_parse_needs_more_context_keeps_order() {
        let reply = LlmReply::parse(
            r#"{"status": "needs_more_context", "answer": "", "requested_files": ["UK.json", "Germany"]}"#,
        )
        .unwrap();
        assert_eq!(reply.status, ReplyStatus::NeedsMoreContext);
        assert_eq!(reply.requested_files, vec!["UK.json", "Germany"]);
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        let err = LlmReply::parse(r#"{"status": "maybe", "answer": "", "requested_files": []}"#)
            .unwrap_err();
        assert!(matches!(err, LLMError::SchemaMismatch(_)));
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        let err = LlmReply::parse(r#"{"status": "answered", "answer": "120"}"#).unwrap_err();
        assert!(matches!(err, LLMError::SchemaMismatch(_)));
    }

    #[test]
    fn test_parse_rejects_extra_field() {
        let err = LlmReply::parse(
            r#"{"status": "answered", "answer": "120", "requested_files": [], "confidence": 0.9}"#,
        )
        .unwrap_err();
        assert!(matches!(err, LLMError::SchemaMismatch(_)));
    }

    #[test]
    fn test_parse_rejects_prose() {
        let err = LlmReply::parse("The Germany headcount is 120.").unwrap_err();
        assert!(matches!(err, LLMError::SchemaMismatch(_)));
    }

    #[test]
    fn test_schema_lists_every_status() {
        let schema = LlmReply::schema();
        let labels = schema["properties"]["status"]["enum"].as_array().unwrap();
        assert_eq!(labels.len(), 3);
        assert!(labels.contains(&json!("needs_more_context")));
        assert_eq!(LlmReply::output_format().mime_type, "application/json");
    }
}

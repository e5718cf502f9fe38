//! Chat request/response types
//!
//! These are the bodies exchanged on `POST /chat`. Every failure the backend
//! can recover from collapses into [`FALLBACK_RESPONSE`], so clients only
//! ever render `response`.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Text returned whenever no grounded answer can be produced.
pub const FALLBACK_MESSAGE: &str = "Unfortunately, based on the currently available data, \
we're unable to provide an answer to your question. For further assistance, please contact \
our Investor Relations team at **ir@moove.io**.";

/// The response sent for every unrecoverable turn.
pub const FALLBACK_RESPONSE: ChatResponse = ChatResponse {
    response: Cow::Borrowed(FALLBACK_MESSAGE),
};

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Opaque client-chosen session identifier
    pub session_id: String,

    /// The user's question
    pub prompt: String,
}

impl ChatRequest {
    /// Create a new chat request
    pub fn new(session_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            prompt: prompt.into(),
        }
    }
}

/// Response body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: Cow<'static, str>,
}

impl ChatResponse {
    /// Wrap an answer produced by the model
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            response: Cow::Owned(text.into()),
        }
    }

    /// Returns true if this is the canned fallback text
    pub fn is_fallback(&self) -> bool {
        self.response == FALLBACK_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_response_wire_format() {
        let json = serde_json::to_value(&FALLBACK_RESPONSE).unwrap();
        assert_eq!(json, serde_json::json!({ "response": FALLBACK_MESSAGE }));
        assert!(FALLBACK_RESPONSE.is_fallback());
    }

    #[test]
    fn test_answer_is_not_fallback() {
        let resp = ChatResponse::answer("120");
        assert_eq!(resp.response, "120");
        assert!(!resp.is_fallback());
    }

    #[test]
    fn test_chat_request_requires_both_fields() {
        let ok: ChatRequest =
            serde_json::from_str(r#"{"session_id": "abc", "prompt": "hi"}"#).unwrap();
        assert_eq!(ok, ChatRequest::new("abc", "hi"));

        let missing = serde_json::from_str::<ChatRequest>(r#"{"session_id": "abc"}"#);
        assert!(missing.is_err());
    }
}

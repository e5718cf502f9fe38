use proptest::prelude::*;
use sdk::errors::{EngineError, EngineErrorExt};
use sdk::types::{ChatRequest, ChatResponse, FALLBACK_RESPONSE};

// Error hints are static text and never echo the wrapped detail
proptest! {
    #[test]
    fn test_error_user_hint_completeness(error_str in "[a-zA-Z0-9_]{12,40}") {
        let errs = vec![
            EngineError::Config(error_str.clone()),
            EngineError::MissingCredential(error_str.clone()),
            EngineError::Context(error_str.clone()),
            EngineError::ContextNotFound(std::path::PathBuf::from(&error_str)),
            EngineError::Network(error_str.clone()),
        ];

        for err in errs {
            let hint = err.user_hint();
            prop_assert!(!hint.is_empty());
            prop_assert!(!hint.contains(&error_str));
        }
    }
}

// Any session id and prompt the frontend sends must be accepted verbatim
proptest! {
    #[test]
    fn test_chat_request_accepts_arbitrary_text(
        session_id in "\\PC*",
        prompt in "\\PC*",
    ) {
        let body = serde_json::json!({ "session_id": session_id, "prompt": prompt });
        let parsed: ChatRequest = serde_json::from_value(body).unwrap();

        prop_assert_eq!(parsed.session_id, session_id);
        prop_assert_eq!(parsed.prompt, prompt);
    }

    #[test]
    fn test_answers_never_look_like_fallback(answer in "[a-zA-Z0-9 .,]{0,64}") {
        let resp = ChatResponse::answer(answer.clone());
        prop_assert!(!resp.is_fallback());
        prop_assert_ne!(resp, FALLBACK_RESPONSE);
    }
}

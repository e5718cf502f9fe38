//! LLM Provider Abstraction Layer
//!
//! The chat engine talks to the model through the [`LLMProvider`] trait.
//! A provider is stateless: it receives the full conversation plus the
//! requested output format and returns the raw reply text. Conversation
//! state lives in [`session::ChatSession`], and the structured reply is
//! decoded by [`reply::LlmReply::parse`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod gemini;
pub mod reply;
pub mod session;

pub use reply::{LlmReply, ReplyStatus};
pub use session::ChatSession;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    /// The reply was delivered but does not match the reply schema
    #[error("Reply does not match schema: {0}")]
    SchemaMismatch(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Message in a conversation history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Role of the message sender
    pub role: MessageRole,

    /// Content of the message
    pub content: String,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create a new model message
    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Model,
            content: content.into(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User message
    User,

    /// Model reply
    Model,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Model => write!(f, "model"),
        }
    }
}

/// Output constraints sent along with every generation request
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFormat {
    /// MIME type of the reply, e.g. `application/json`
    pub mime_type: String,

    /// Schema the reply must conform to
    pub schema: Option<serde_json::Value>,
}

impl OutputFormat {
    /// Plain text replies
    pub fn text() -> Self {
        Self {
            mime_type: "text/plain".to_string(),
            schema: None,
        }
    }

    /// JSON replies constrained by `schema`
    pub fn json(schema: serde_json::Value) -> Self {
        Self {
            mime_type: "application/json".to_string(),
            schema: Some(schema),
        }
    }
}

/// LLM Provider trait that all providers must implement
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Returns the name of the provider (e.g. "gemini")
    fn name(&self) -> &str;

    /// Generate the next model turn for `messages`
    ///
    /// # Returns
    /// * `Ok(String)` - The raw reply text
    /// * `Err(LLMError)` - If the request fails
    async fn generate(&self, messages: &[Message], output: &OutputFormat) -> Result<String>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted provider for unit tests.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays canned replies in order and records every request.
    #[derive(Default)]
    pub struct ScriptedProvider {
        replies: Mutex<VecDeque<Result<String>>>,
        requests: Mutex<Vec<Vec<Message>>>,
        latency: Option<Duration>,
    }

    impl ScriptedProvider {
        pub fn new() -> Self {
            Self::default()
        }

        /// Answer every call only after `latency`
        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = Some(latency);
            self
        }

        /// Queue a reply text
        pub fn reply(self, text: impl Into<String>) -> Self {
            self.replies.lock().unwrap().push_back(Ok(text.into()));
            self
        }

        /// Queue a structured reply
        pub fn reply_json(self, value: serde_json::Value) -> Self {
            self.reply(value.to_string())
        }

        /// Queue a failure
        pub fn fail(self, err: LLMError) -> Self {
            self.replies.lock().unwrap().push_back(Err(err));
            self
        }

        /// Number of generate calls seen so far
        pub fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        /// Messages sent with the `n`th call
        pub fn request(&self, n: usize) -> Vec<Message> {
            self.requests.lock().unwrap()[n].clone()
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, messages: &[Message], _output: &OutputFormat) -> Result<String> {
            self.requests.lock().unwrap().push(messages.to_vec());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LLMError::Unknown("script exhausted".to_string())));

            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            reply
        }
    }
}

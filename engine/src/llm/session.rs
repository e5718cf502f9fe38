//! Conversational handle over a stateless provider
//!
//! A [`ChatSession`] owns the message history of one client conversation and
//! replays it to the provider on every turn. A turn is committed to history
//! only when the provider answers, so a failed call leaves the conversation
//! exactly as it was.
//!
//! Each message is atomic on its own. A client turn that spans several
//! messages (a question plus its follow-up) holds [`ChatSession::begin_turn`]
//! so no other turn on the session can interleave with it.

use super::{LLMProvider, LlmReply, Message, OutputFormat, Result};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

pub struct ChatSession {
    provider: Arc<dyn LLMProvider>,
    output: OutputFormat,
    history: Mutex<Vec<Message>>,
    turn: Mutex<()>,
}

/// Exclusive right to run a turn on a session; released on drop.
pub type TurnGuard<'a> = MutexGuard<'a, ()>;

impl ChatSession {
    /// Create an empty session whose replies follow `output`
    pub fn new(provider: Arc<dyn LLMProvider>, output: OutputFormat) -> Self {
        Self {
            provider,
            output,
            history: Mutex::new(Vec::new()),
            turn: Mutex::new(()),
        }
    }

    /// Wait for any turn in progress on this session, then claim it.
    pub async fn begin_turn(&self) -> TurnGuard<'_> {
        self.turn.lock().await
    }

    /// Send `text` as the next user turn and return the raw reply.
    pub async fn send_message(&self, text: impl Into<String>) -> Result<String> {
        let mut history = self.history.lock().await;

        let mut messages = history.clone();
        messages.push(Message::user(text));

        let reply = self.provider.generate(&messages, &self.output).await?;

        messages.push(Message::model(reply.clone()));
        *history = messages;

        Ok(reply)
    }

    /// Send `text` and decode the reply as an [`LlmReply`].
    ///
    /// Decoding failures do not roll back history: the model did answer.
    pub async fn send_structured(&self, text: impl Into<String>) -> Result<LlmReply> {
        let raw = self.send_message(text).await?;
        LlmReply::parse(&raw)
    }

    /// Number of messages committed so far
    pub async fn len(&self) -> usize {
        self.history.lock().await.len()
    }

    /// Snapshot of the committed history
    pub async fn history(&self) -> Vec<Message> {
        self.history.lock().await.clone()
    }

    /// Name of the backing provider
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("provider", &self.provider.name())
            .field("output", &self.output.mime_type)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedProvider;
    use crate::llm::{LLMError, MessageRole, ReplyStatus};
    use serde_json::json;

    #[tokio::test]
    async fn test_history_grows_by_turn() {
        let provider = Arc::new(ScriptedProvider::new().reply("ok").reply("again"));
        let session = ChatSession::new(provider.clone(), OutputFormat::text());

        assert_eq!(session.send_message("first").await.unwrap(), "ok");
        assert_eq!(session.send_message("second").await.unwrap(), "again");

        let history = session.history().await;
        assert_eq!(history.len(), 4);
        assert_eq!(history[0], Message::user("first"));
        assert_eq!(history[1], Message::model("ok"));

        // The provider sees the full conversation on every call
        let second = provider.request(1);
        assert_eq!(second.len(), 3);
        assert_eq!(second[2].role, MessageRole::User);
        assert_eq!(second[2].content, "second");
    }

    #[tokio::test]
    async fn test_failed_turn_is_not_committed() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .fail(LLMError::NetworkError("connection reset".into()))
                .reply("ok"),
        );
        let session = ChatSession::new(provider.clone(), OutputFormat::text());

        assert!(session.send_message("lost").await.is_err());
        assert_eq!(session.len().await, 0);

        session.send_message("kept").await.unwrap();
        assert_eq!(provider.request(1), vec![Message::user("kept")]);
    }

    #[tokio::test]
    async fn test_send_structured() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .reply_json(json!({"status": "not_found", "answer": "", "requested_files": []}))
                .reply("not json"),
        );
        let session = ChatSession::new(provider, LlmReply::output_format());

        let reply = session.send_structured("q1").await.unwrap();
        assert_eq!(reply.status, ReplyStatus::NotFound);

        let err = session.send_structured("q2").await.unwrap_err();
        assert!(matches!(err, LLMError::SchemaMismatch(_)));
        assert_eq!(session.len().await, 4);
    }

    #[tokio::test]
    async fn test_begin_turn_is_exclusive() {
        let provider = Arc::new(ScriptedProvider::new());
        let session = ChatSession::new(provider, OutputFormat::text());

        let guard = session.begin_turn().await;
        assert!(session.turn.try_lock().is_err());
        drop(guard);
        assert!(session.turn.try_lock().is_ok());
    }
}

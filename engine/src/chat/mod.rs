//! Chat turn orchestration
//!
//! One user turn is at most two model calls:
//!
//! ```text
//! prompt -> answered            -> answer
//!        -> not_found           -> fallback
//!        -> needs_more_context  -> load files -> (none)    -> fallback
//!                                             -> (some)    -> resend -> not_found -> fallback
//!                                                                    -> otherwise -> answer
//! ```
//!
//! Every failure along the way (transport, schema mismatch, missing files)
//! ends the turn with [`FALLBACK_RESPONSE`].
//!
//! A turn holds the session's turn guard from the first send until the
//! follow-up is answered, so concurrent turns on one session run one after
//! the other.

pub mod prompt;

use crate::context::ContextStore;
use crate::llm::{ChatSession, LlmReply, ReplyStatus};
use sdk::{ChatResponse, FALLBACK_RESPONSE};
use std::sync::Arc;

/// Runs chat turns against a session, pulling supplementary context from
/// the [`ContextStore`] when the model asks for it.
#[derive(Debug, Clone)]
pub struct ChatService {
    context: Arc<ContextStore>,
}

impl ChatService {
    pub fn new(context: Arc<ContextStore>) -> Self {
        Self { context }
    }

    /// Run one user turn and produce the response for the client.
    pub async fn process_turn(&self, session: &ChatSession, user_prompt: &str) -> ChatResponse {
        let _turn = session.begin_turn().await;

        let Some(reply) = send_and_parse(session, user_prompt).await else {
            return FALLBACK_RESPONSE;
        };

        tracing::debug!(status = %reply.status, "Model replied");

        match reply.status {
            ReplyStatus::Answered => ChatResponse::answer(reply.answer),
            ReplyStatus::NotFound => FALLBACK_RESPONSE,
            ReplyStatus::NeedsMoreContext => {
                self.handle_additional_context(session, &reply.requested_files)
                    .await
            }
        }
    }

    /// Supply the requested documents and ask once more.
    ///
    /// No second call is made when none of the requested files exist.
    /// Callers outside [`ChatService::process_turn`] must hold
    /// [`ChatSession::begin_turn`] themselves.
    pub async fn handle_additional_context(
        &self,
        session: &ChatSession,
        requested_files: &[String],
    ) -> ChatResponse {
        let extra_context = self.context.load_context_files(requested_files).await;
        if extra_context.is_empty() {
            tracing::info!(
                requested = ?requested_files,
                "None of the requested context files are available"
            );
            return FALLBACK_RESPONSE;
        }

        tracing::info!(
            loaded = ?extra_context.stems(),
            "Sending additional context"
        );

        let message = prompt::additional_context_prompt(requested_files, &extra_context);
        match send_and_parse(session, &message).await {
            Some(reply) if reply.status != ReplyStatus::NotFound => {
                ChatResponse::answer(reply.answer)
            }
            _ => FALLBACK_RESPONSE,
        }
    }
}

async fn send_and_parse(session: &ChatSession, text: &str) -> Option<LlmReply> {
    match session.send_structured(text).await {
        Ok(reply) => Some(reply),
        Err(e) => {
            tracing::warn!("Error sending message or parsing response: {}", e);
            None
        }
    }
}

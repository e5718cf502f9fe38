//! Session registry
//!
//! Maps client-chosen session ids to [`ChatSession`] handles. Sessions are
//! created on first use, primed with the main context, and kept for the
//! lifetime of the process.
//!
//! Creation goes through a per-id [`OnceCell`], so concurrent first requests
//! for the same id share one handle and one initialization call. The map
//! lock is only held to look up the cell, never across the LLM call.

use crate::chat::prompt;
use crate::llm::{self, ChatSession, LLMProvider, LlmReply};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

/// Keyed store of chat sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look up an existing session
    async fn get(&self, session_id: &str) -> Option<Arc<ChatSession>>;

    /// Return the session for `session_id`, creating it on first use.
    ///
    /// # Errors
    ///
    /// Fails if the new session could not be initialized. Nothing is stored
    /// in that case, so the next call retries.
    async fn get_or_create(&self, session_id: &str) -> llm::Result<Arc<ChatSession>>;

    /// Number of live sessions
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds and primes new sessions
pub struct SessionFactory {
    provider: Arc<dyn LLMProvider>,
    initial_prompt: String,
}

impl SessionFactory {
    /// Sessions created by this factory are primed with `main_context`
    pub fn new(provider: Arc<dyn LLMProvider>, main_context: &Value) -> Self {
        Self {
            provider,
            initial_prompt: prompt::initial_prompt(main_context),
        }
    }

    /// Create a structured-output session and send the initialization message.
    pub async fn create(&self) -> llm::Result<ChatSession> {
        let session = ChatSession::new(Arc::clone(&self.provider), LlmReply::output_format());
        // The reply to the priming message carries nothing for the user
        session.send_message(self.initial_prompt.as_str()).await?;
        tracing::debug!(provider = session.provider_name(), "Chat session primed");
        Ok(session)
    }
}

type SessionCell = Arc<OnceCell<Arc<ChatSession>>>;

/// In-memory [`SessionStore`]; sessions are never evicted.
pub struct InMemorySessionStore {
    factory: SessionFactory,
    sessions: Mutex<HashMap<String, SessionCell>>,
}

impl InMemorySessionStore {
    pub fn new(factory: SessionFactory) -> Self {
        Self {
            factory,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn cell(&self, session_id: &str) -> SessionCell {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(sessions.entry(session_id.to_string()).or_default())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str) -> Option<Arc<ChatSession>> {
        let cell = {
            let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
            sessions.get(session_id).map(Arc::clone)
        }?;
        cell.get().map(Arc::clone)
    }

    async fn get_or_create(&self, session_id: &str) -> llm::Result<Arc<ChatSession>> {
        let cell = self.cell(session_id);
        let session = cell
            .get_or_try_init(|| async {
                tracing::info!(session_id, "Creating chat session");
                self.factory.create().await.map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(session))
    }

    fn len(&self) -> usize {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.values().filter(|cell| cell.initialized()).count()
    }
}

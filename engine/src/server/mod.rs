//! HTTP surface
//!
//! # Endpoints
//!
//! - POST /chat - Run one chat turn: `{session_id, prompt}` -> `{response}`
//! - GET /health - Liveness and live session count
//!
//! CORS admits a single configured origin; preflights from any other origin
//! get no `Access-Control-Allow-Origin` header. Credentials are allowed, so
//! methods and headers are mirrored from the preflight request rather than
//! answered with `*`.

use crate::chat::ChatService;
use crate::session::SessionStore;
use axum::{
    extract::State,
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use sdk::errors::EngineError;
use sdk::{ChatRequest, ChatResponse, FALLBACK_RESPONSE};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub chat: Arc<ChatService>,
}

impl AppState {
    pub fn new(sessions: Arc<dyn SessionStore>, chat: ChatService) -> Self {
        Self {
            sessions,
            chat: Arc::new(chat),
        }
    }
}

/// Build the CORS layer for `origin`.
///
/// # Errors
///
/// Returns `EngineError::Config` if `origin` is not a valid header value.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, EngineError> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|e| EngineError::Config(format!("Invalid CORS origin '{}': {}", origin, e)))?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

/// Build the router (shared between production startup and tests).
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, app: Router) -> Result<(), EngineError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| EngineError::Network(format!("Failed to bind to {}: {}", addr, e)))?;

    let local = listener
        .local_addr()
        .map_err(|e| EngineError::Network(format!("Failed to get local address: {}", e)))?;
    tracing::info!("Listening on http://{}", local);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutdown signal received");
        })
        .await
        .map_err(|e| EngineError::Network(format!("Server error: {}", e)))
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let span = tracing::info_span!("chat", session_id = %request.session_id);
    Json(run_turn(&state, &request).instrument(span).await)
}

async fn run_turn(state: &AppState, request: &ChatRequest) -> ChatResponse {
    let session = match state.sessions.get_or_create(&request.session_id).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!("Failed to initialize chat session: {}", e);
            return FALLBACK_RESPONSE;
        }
    };

    let response = state.chat.process_turn(&session, &request.prompt).await;
    tracing::info!(fallback = response.is_fallback(), "Chat turn complete");
    response
}

async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "sessions": state.sessions.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_accepts_origin() {
        assert!(cors_layer("http://localhost:5173").is_ok());
    }

    #[test]
    fn test_cors_layer_rejects_invalid_origin() {
        let err = cors_layer("http://bad\norigin").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }
}

//! IR Chat SDK
//!
//! Shared library providing the wire types and error taxonomy of the IR chat
//! backend. This crate is used by the engine and by anything that talks to
//! its HTTP API.

/// Error types and handling
pub mod errors;

/// Chat request/response types
pub mod types;

// Re-export commonly used types
pub use errors::{EngineError, EngineErrorExt};
pub use types::{ChatRequest, ChatResponse, FALLBACK_MESSAGE, FALLBACK_RESPONSE};

//! Error types and handling
//!
//! This module provides the error types used throughout the IR chat engine.
//! All errors implement the `EngineErrorExt` trait which provides operator
//! hints and indicates whether errors are recoverable.
//!
//! # Security
//!
//! Hints never include secrets (API keys) or raw upstream payloads. Nothing
//! in this module is ever sent to the HTTP caller; request-time failures are
//! answered with the fallback message instead.

use thiserror::Error;

/// Trait for engine error extensions
pub trait EngineErrorExt {
    /// Returns a short hint describing how to fix the error
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors only affect a single request. Non-recoverable
    /// errors prevent the server from starting.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Configuration**: Invalid config file or missing credential
/// - **Context**: Company data directory and JSON documents
/// - **Network**: Listener and socket failures
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, EngineErrorExt};
///
/// let error = EngineError::MissingCredential("GEMINI_API_KEY".to_string());
/// println!("Hint: {}", error.user_hint());
/// assert!(!error.is_recoverable());
///
/// let error = EngineError::Context("Germany.json is not valid JSON".to_string());
/// assert!(error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),

    // Context document errors
    #[error("Context error: {0}")]
    Context(String),

    #[error("Context file not found: {0:?}")]
    ContextNotFound(std::path::PathBuf),

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your ir-chat.toml file for errors",
            Self::MissingCredential(_) => "Export the API key or add it to a .env file",
            Self::Context(_) => "Check that the company data files are valid JSON",
            Self::ContextNotFound(_) => "Check the context data_dir and main_file settings",
            Self::Network(_) => "Network operation failed. Check host and port settings",
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Startup failures
            Self::Config(_)
            | Self::MissingCredential(_)
            | Self::ContextNotFound(_)
            | Self::Network(_) => false,

            _ => true,
        }
    }
}

//! IR Chat Engine Library
//!
//! This library provides the core functionality of the investor-relations
//! chat backend. It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Credential handling module
pub mod secrets;

/// Company data context store
pub mod context;

/// LLM provider abstraction layer
pub mod llm;

/// Session registry module
pub mod session;

/// Chat turn orchestration module
pub mod chat;

/// HTTP server module
pub mod server;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;

//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - serve: Load company data, then run the HTTP server
//! - files: List the context documents the model can request
//! - doctor: Validate configuration, credential and company data

use anyhow::{Context, Result};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::chat::ChatService;
use crate::config::Config;
use crate::context::ContextStore;
use crate::llm::gemini::GeminiProvider;
use crate::session::{InMemorySessionStore, SessionFactory};
use crate::server::{self, AppState};
use sdk::errors::{EngineError, EngineErrorExt};

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Everything the HTTP server needs, built from config.
///
/// Fails if the credential is missing or the main context document is
/// missing or malformed.
pub fn build_state(config: &Config) -> Result<AppState> {
    let api_key = config.api_key()?;

    let context = ContextStore::open(&config.context.data_dir, &config.context.main_file)?;
    let main_context = context
        .load_main_context()
        .context("Failed to load main context document")?;
    tracing::info!(
        dir = ?context.dir(),
        files = context.available().len(),
        "Loaded company data"
    );

    let provider = Arc::new(GeminiProvider::new(config.llm.gemini.clone(), api_key));
    let sessions = InMemorySessionStore::new(SessionFactory::new(provider, &main_context));

    Ok(AppState::new(
        Arc::new(sessions),
        ChatService::new(Arc::new(context)),
    ))
}

/// Start the HTTP server and block until shutdown
pub async fn handle_serve(config: &Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", host, port))?;

    let state = build_state(config)?;
    let cors = server::cors_layer(&config.server.cors_origin)?;
    tracing::info!(
        model = %config.llm.gemini.model,
        cors_origin = %config.server.cors_origin,
        "Starting chat server"
    );

    server::serve(addr, server::build_router(state, cors)).await?;
    Ok(())
}

/// List the context documents available to the model
pub fn handle_files(config: &Config, format: OutputFormat) -> Result<()> {
    let context = ContextStore::open(&config.context.data_dir, &config.context.main_file)?;
    let files = context.available();

    match format {
        OutputFormat::Text => {
            if files.is_empty() {
                println!("No context files found in {}", context.dir().display());
            } else {
                println!("Context files ({}):", context.dir().display());
                for file in &files {
                    println!("  {}", file);
                }
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "dir": context.dir(),
                "files": files,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Run diagnostics
///
/// Every check runs even when an earlier one fails, so one invocation
/// reports all problems.
pub fn handle_doctor(config: &Config, format: OutputFormat) -> Result<()> {
    let mut checks: Vec<(&str, String)> = Vec::new();
    let mut issues = Vec::new();
    let describe = |e: &EngineError| format!("{} (hint: {})", e, e.user_hint());

    // Config is already validated when loaded
    checks.push(("Configuration", "Valid".to_string()));

    match config.api_key() {
        Ok(_) => checks.push(("API key", format!("{} is set", config.llm.gemini.api_key_env))),
        Err(e) => {
            checks.push(("API key", "Missing".to_string()));
            issues.push(describe(&e));
        }
    }

    match ContextStore::open(&config.context.data_dir, &config.context.main_file) {
        Ok(context) => {
            checks.push(("Data directory", format!("{} files", context.available().len())));
            match context.load_main_context() {
                Ok(_) => checks.push(("Main context", "Valid JSON".to_string())),
                Err(e) => {
                    checks.push(("Main context", "Unusable".to_string()));
                    issues.push(describe(&e));
                }
            }
        }
        Err(e) => {
            checks.push(("Data directory", "Unreadable".to_string()));
            issues.push(describe(&e));
        }
    }

    match format {
        OutputFormat::Text => {
            println!("IR Chat Diagnostics:");
            println!();
            for (name, status) in &checks {
                println!("  {:<16} {}", name, status);
            }
            if issues.is_empty() {
                println!();
                println!("No issues found.");
            } else {
                println!();
                println!("Issues:");
                for issue in &issues {
                    println!("  - {}", issue);
                }
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "checks": checks
                    .iter()
                    .map(|(name, status)| json!({"name": name, "status": status}))
                    .collect::<Vec<_>>(),
                "issues": issues,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("{} issue(s) found", issues.len())
    }
}

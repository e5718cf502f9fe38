//! CLI interface for IR Chat
//!
//! This module provides the command-line interface using clap's derive API.
//! Running the binary without a subcommand starts the HTTP server.

use crate::config::{self, Config};
use clap::{Parser, Subcommand};
use sdk::errors::EngineError;
use std::path::PathBuf;

/// Investor-relations chat backend
///
/// Answers investor questions with an LLM grounded in the company data
/// directory, fetching extra documents when the model asks for them.
#[derive(Parser, Debug)]
#[command(name = "ir-chat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The subcommand to run; `serve` with config defaults when omitted
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve {
            host: None,
            port: None,
        })
    }

    /// Effective log level: `--log` when given, else `core.log_level`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` if `--log` is not a known level.
    pub fn log_level<'a>(&'a self, config: &'a Config) -> Result<&'a str, EngineError> {
        match self.log.as_deref() {
            Some(level) => {
                config::validate_log_level(level)?;
                Ok(level)
            }
            None => Ok(config.core.log_level.as_str()),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Interface to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List the context documents the model can request
    Files,

    /// Validate configuration, credential and company data
    Doctor,
}

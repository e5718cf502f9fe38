// IR Chat
// Main entry point for the ir-chat binary

use clap::Parser;
use ir_chat_engine::cli::{Cli, Command};
use ir_chat_engine::config::Config;
use ir_chat_engine::handlers::{handle_doctor, handle_files, handle_serve, OutputFormat};
use ir_chat_engine::telemetry::init_telemetry_with_level;
use sdk::errors::{EngineError, EngineErrorExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up GEMINI_API_KEY and friends from a local .env file
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    let result = run(cli).await;
    if let Err(e) = &result {
        if let Some(err) = e.chain().find_map(|cause| cause.downcast_ref::<EngineError>()) {
            if !err.is_recoverable() {
                eprintln!("ir-chat cannot start.");
            }
            eprintln!("Hint: {}", err.user_hint());
        }
    }
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load configuration (or use custom path if provided)
    let config = Config::load(cli.config.as_deref())?;

    // RUST_LOG still wins over both
    init_telemetry_with_level(cli.log_level(&config)?);

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    tracing::info!("IR Chat v{} ({} - {})", version, commit, timestamp);

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Handle commands
    match cli.command() {
        Command::Serve { host, port } => handle_serve(&config, host, port).await,
        Command::Files => handle_files(&config, format),
        Command::Doctor => {
            tracing::info!("Running diagnostics...");
            handle_doctor(&config, format)
        }
    }
}

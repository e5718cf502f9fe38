//! Configuration management
//!
//! This module handles loading, validation, and management of the IR chat
//! configuration. Configuration is stored in TOML format, by default at
//! `./ir-chat.toml`. Every section and field has a default, so a missing
//! default file simply yields the built-in configuration.
//!
//! # Configuration Sections
//!
//! - **core**: Log level
//! - **server**: Bind address and the single allowed CORS origin
//! - **llm**: Gemini endpoint, model and the env var holding the API key
//! - **context**: Company data directory and the main context file
//!
//! # Credentials
//!
//! The API key is never stored in the config file. `llm.gemini.api_key_env`
//! names the environment variable it is read from (see [`Config::api_key`]).
//!
//! # Examples
//!
//! ```no_run
//! use ir_chat_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load(None)?;
//! println!("Listening on {}:{}", config.server.host, config.server.port);
//! println!("Model: {}", config.llm.gemini.model);
//! # Ok(())
//! # }
//! ```

use crate::secrets::ApiKey;
use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name, resolved against the working directory
pub const DEFAULT_CONFIG_FILE: &str = "ir-chat.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Core settings
    #[serde(default)]
    pub core: CoreConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// LLM provider configuration
    #[serde(default)]
    pub llm: LLMConfig,

    /// Company data settings
    #[serde(default)]
    pub context: ContextConfig,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,

    /// The only origin allowed by CORS
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

/// LLM provider configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Gemini provider settings
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL for Gemini API
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

/// Company data configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Directory holding the JSON documents (supports ~ expansion)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// File inside `data_dir` sent to every new session
    #[serde(default = "default_main_file")]
    pub main_file: String,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origin() -> String {
    "http://localhost:5173".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("company_data")
}

fn default_main_file() -> String {
    "context.json".to_string()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            main_file: default_main_file(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from `./ir-chat.toml` when `None`.
    ///
    /// An explicit path must exist. The default path is optional: when it is
    /// absent the built-in defaults are used.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An explicit configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load(path: Option<&Path>) -> Result<Self, EngineError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from_path(default_path)
                } else {
                    let mut config = Self::default();
                    config.validate_and_process()?;
                    Ok(config)
                }
            }
        }
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Read the Gemini API key from the configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MissingCredential` if the variable is unset or
    /// blank.
    pub fn api_key(&self) -> Result<ApiKey, EngineError> {
        crate::secrets::from_env(&self.llm.gemini.api_key_env)
    }

    /// Full path of the main context document
    pub fn main_context_path(&self) -> PathBuf {
        self.context.data_dir.join(&self.context.main_file)
    }

    /// Validate and process configuration
    ///
    /// This method:
    /// - Validates the log level and server settings
    /// - Validates the Gemini settings
    /// - Expands ~ in the data directory
    /// - Checks the main file is a bare `.json` file name
    fn validate_and_process(&mut self) -> Result<(), EngineError> {
        validate_log_level(&self.core.log_level)?;

        if self.server.host.trim().is_empty() {
            return Err(EngineError::Config("server.host must not be empty".to_string()));
        }

        if !self.server.cors_origin.starts_with("http://")
            && !self.server.cors_origin.starts_with("https://")
        {
            return Err(EngineError::Config(format!(
                "server.cors_origin must be an http(s) origin, got '{}'",
                self.server.cors_origin
            )));
        }

        // Validate provider settings
        let gemini = &mut self.llm.gemini;
        if gemini.model.trim().is_empty() {
            return Err(EngineError::Config("llm.gemini.model must not be empty".to_string()));
        }
        if gemini.api_key_env.trim().is_empty() {
            return Err(EngineError::Config(
                "llm.gemini.api_key_env must not be empty".to_string(),
            ));
        }
        while gemini.base_url.ends_with('/') {
            gemini.base_url.pop();
        }

        // Main file lives directly inside data_dir
        let main_file = Path::new(&self.context.main_file);
        if main_file.components().count() != 1
            || main_file.extension().and_then(|e| e.to_str()) != Some("json")
        {
            return Err(EngineError::Config(format!(
                "context.main_file must be a .json file name, got '{}'",
                self.context.main_file
            )));
        }

        self.context.data_dir = expand_path(&self.context.data_dir)?;

        Ok(())
    }
}

/// Log levels accepted by `core.log_level` and `--log`
pub const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Check that `level` is one of [`LOG_LEVELS`].
pub fn validate_log_level(level: &str) -> Result<(), EngineError> {
    if LOG_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(EngineError::Config(format!(
            "Invalid log level '{}'. Must be one of: {}",
            level,
            LOG_LEVELS.join(", ")
        )))
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creation() {
        let config = Config::default();

        assert_eq!(config.core.log_level, "info");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.cors_origin, "http://localhost:5173");
        assert_eq!(config.llm.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.llm.gemini.api_key_env, "GEMINI_API_KEY");
        assert_eq!(
            config.main_context_path(),
            PathBuf::from("company_data").join("context.json")
        );
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test");
        let expanded = expand_path(&path).unwrap();

        let home = dirs::home_dir().unwrap();
        assert_eq!(expanded, home.join("test"));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let path = PathBuf::from("/absolute/path");
        let expanded = expand_path(&path).unwrap();

        assert_eq!(expanded, path);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.context.main_file, "context.json");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = Config::from_toml_str(
            r#"
[llm.gemini]
base_url = "http://localhost:9999/v1beta/"
"#,
        )
        .unwrap();
        assert_eq!(config.llm.gemini.base_url, "http://localhost:9999/v1beta");
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let err = Config::from_toml_str("[core]\nlog_level = \"loud\"\n").unwrap_err();
        assert!(matches!(err, EngineError::Config(msg) if msg.contains("loud")));
    }

    #[test]
    fn test_validate_log_level() {
        for level in LOG_LEVELS {
            assert!(validate_log_level(level).is_ok());
        }
        assert!(matches!(validate_log_level("loud"), Err(EngineError::Config(_))));
        assert!(validate_log_level("INFO").is_err());
    }

    #[test]
    fn test_main_file_must_be_bare_json_name() {
        assert!(Config::from_toml_str("[context]\nmain_file = \"../context.json\"\n").is_err());
        assert!(Config::from_toml_str("[context]\nmain_file = \"context.yaml\"\n").is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_string = toml::to_string(&config).unwrap();

        let deserialized = Config::from_toml_str(&toml_string).unwrap();
        assert_eq!(config.server.port, deserialized.server.port);
        assert_eq!(config.llm.gemini.model, deserialized.llm.gemini.model);
    }
}

//! Credential handling
//!
//! The Gemini API key is read once at startup from the process environment
//! and carried around as an [`ApiKey`] so it never ends up in logs.

use sdk::errors::EngineError;
use std::fmt;
use zeroize::Zeroizing;

/// Provider API key.
///
/// Formats as `[REDACTED]` and wipes its buffer on drop. Use
/// [`ApiKey::expose`] only at the point the key goes on the wire.
#[derive(Clone)]
pub struct ApiKey(Zeroizing<String>);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Zeroizing::new(key.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Read an API key from the environment variable `var`.
///
/// Surrounding whitespace is trimmed; blank values count as missing.
///
/// # Errors
///
/// Returns `EngineError::MissingCredential` naming `var` when it is unset,
/// blank or not valid unicode.
pub fn from_env(var: &str) -> Result<ApiKey, EngineError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(ApiKey::new(value.trim())),
        _ => Err(EngineError::MissingCredential(var.to_string())),
    }
}

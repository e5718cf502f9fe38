//! Company data context store
//!
//! The data directory is scanned once when the store is opened. Every
//! `*.json` file becomes addressable by its stem (`Germany.json` ->
//! `Germany`). The main document is read once at startup; supplementary
//! documents are re-read from disk on every request and never cached.

use sdk::errors::EngineError;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const JSON_EXTENSION: &str = ".json";

/// Supplementary documents in the order the model asked for them.
///
/// Serializes as a JSON object keyed by stem, preserving that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedContext {
    entries: Vec<(String, Value)>,
}

impl LoadedContext {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Content of the document with this stem
    pub fn get(&self, stem: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == stem)
            .map(|(_, value)| value)
    }

    /// Stems in request order
    pub fn stems(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    fn contains(&self, stem: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == stem)
    }

    fn push(&mut self, stem: &str, value: Value) {
        self.entries.push((stem.to_string(), value));
    }
}

impl FromIterator<(String, Value)> for LoadedContext {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Serialize for LoadedContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(name, value)| (name, value)))
    }
}

/// Read-only view over the company data directory
#[derive(Debug, Clone)]
pub struct ContextStore {
    dir: PathBuf,
    main_file: String,
    files: BTreeMap<String, PathBuf>,
}

impl ContextStore {
    /// Enumerate the JSON documents in `dir`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Context` if the directory cannot be listed.
    pub fn open(dir: impl Into<PathBuf>, main_file: impl Into<String>) -> Result<Self, EngineError> {
        let dir = dir.into();
        let entries = fs::read_dir(&dir).map_err(|e| {
            EngineError::Context(format!("Failed to read data directory {:?}: {}", dir, e))
        })?;

        let mut files = BTreeMap::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(stem) = name.strip_suffix(JSON_EXTENSION) {
                files.insert(stem.to_string(), path.clone());
            }
        }

        tracing::debug!(dir = ?dir, count = files.len(), "Enumerated context files");

        Ok(Self {
            dir,
            main_file: main_file.into(),
            files,
        })
    }

    /// Data directory this store was opened on
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stems of every known document, sorted
    pub fn available(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    /// Read and parse the main context document.
    ///
    /// # Errors
    ///
    /// - `EngineError::ContextNotFound` if the file does not exist
    /// - `EngineError::Context` if it cannot be read or is not valid JSON
    pub fn load_main_context(&self) -> Result<Value, EngineError> {
        let path = self.dir.join(&self.main_file);
        if !path.is_file() {
            return Err(EngineError::ContextNotFound(path));
        }
        read_json(&path)
    }

    /// Load the supplementary documents named in `names`.
    ///
    /// Names may be given with or without the `.json` extension. Unknown
    /// names are skipped, as are known files that fail to read or parse.
    /// The result is keyed by stem, keeps request order and may be empty.
    pub async fn load_context_files<S: AsRef<str>>(&self, names: &[S]) -> LoadedContext {
        let mut loaded = LoadedContext::default();

        for name in names {
            let name = name.as_ref().trim();
            let stem = name.strip_suffix(JSON_EXTENSION).unwrap_or(name);

            let Some(path) = self.files.get(stem) else {
                tracing::debug!(file = %stem, "Requested context file is unknown");
                continue;
            };
            if loaded.contains(stem) {
                continue;
            }

            let contents = match tokio::fs::read_to_string(path).await {
                Ok(contents) => contents,
                Err(e) => {
                    tracing::warn!(file = %stem, "Failed to read context file: {}", e);
                    continue;
                }
            };
            match serde_json::from_str(&contents) {
                Ok(value) => loaded.push(stem, value),
                Err(e) => tracing::warn!(file = %stem, "Context file is not valid JSON: {}", e),
            }
        }

        loaded
    }
}

fn read_json(path: &Path) -> Result<Value, EngineError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| EngineError::Context(format!("Failed to read {:?}: {}", path, e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| EngineError::Context(format!("Failed to parse {:?}: {}", path, e)))
}

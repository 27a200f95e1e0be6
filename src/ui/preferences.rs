//! Local key/value preference storage.
//!
//! The client keeps user preferences (currently only the theme) in a small
//! JSON object on disk, one string value per key.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::FeedError;

/// String key/value store for user preferences.
pub trait PreferenceStore {
    /// Returns the stored value for `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Preferences`] if the value cannot be persisted.
    fn set(&mut self, key: &str, value: &str) -> Result<(), FeedError>;
}

/// Preferences kept only for the life of the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl MemoryPreferences {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), FeedError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences persisted as a JSON object in a file.
///
/// The file is read once on open and rewritten on every `set`.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    /// Opens the store at `path`. A missing file is an empty store; an
    /// unreadable or corrupt one is logged and treated as empty.
    #[must_use]
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt preference file");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read preference file");
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    fn flush(&self) -> Result<(), FeedError> {
        let raw = serde_json::to_string_pretty(&self.values).map_err(encode_error)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// Encoding failures are storage failures, not inbound payload errors.
fn encode_error(e: serde_json::Error) -> FeedError {
    FeedError::Preferences(io::Error::other(e))
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), FeedError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

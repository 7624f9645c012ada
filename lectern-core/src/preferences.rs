//! Standing provider/model preference.
//!
//! The conversation reads the preference once when it starts and writes it
//! back whenever the reader switches provider or model.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from reading or writing preferences.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// The preference file could not be read or written.
    #[error("preference file '{path}': {source}")]
    Io {
        /// Path to the preference file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The preference file is not valid TOML.
    #[error("failed to parse preference file '{path}': {source}")]
    Parse {
        /// Path to the preference file.
        path: PathBuf,
        /// The underlying TOML parse error.
        source: toml::de::Error,
    },

    /// The preference could not be serialised.
    #[error("failed to serialise preferences: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// The reader's chosen provider and model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    /// Provider name (e.g., "anthropic").
    pub provider: String,
    /// Model identifier.
    pub model: String,
}

impl Preference {
    /// Create a preference.
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }
}

/// Storage for the standing [`Preference`].
pub trait PreferenceStore: Send + Sync {
    /// Read the stored preference, `None` if nothing was stored yet.
    fn load(&self) -> Result<Option<Preference>, PreferenceError>;

    /// Replace the stored preference.
    fn save(&self, preference: &Preference) -> Result<(), PreferenceError>;
}

/// Preference kept in a TOML file.
#[derive(Debug, Clone)]
pub struct TomlPreferenceStore {
    path: PathBuf,
}

impl TomlPreferenceStore {
    /// Store preferences at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.config/lectern/preferences.toml`, if a home directory exists.
    pub fn user_default() -> Option<Self> {
        crate::config::config_dir().map(|dir| Self::new(dir.join("preferences.toml")))
    }

    /// Location of the preference file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PreferenceError {
        PreferenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl PreferenceStore for TomlPreferenceStore {
    fn load(&self) -> Result<Option<Preference>, PreferenceError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        toml::from_str(&content)
            .map(Some)
            .map_err(|source| PreferenceError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&self, preference: &Preference) -> Result<(), PreferenceError> {
        let content = toml::to_string(preference)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, content).map_err(|e| self.io_error(e))
    }
}

/// Preference held in memory. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    slot: Arc<Mutex<Option<Preference>>>,
}

impl MemoryPreferenceStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `preference`.
    pub fn with_preference(preference: Preference) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(preference))),
        }
    }

    /// Current content of the slot.
    pub fn current(&self) -> Option<Preference> {
        match self.slot.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Result<Option<Preference>, PreferenceError> {
        Ok(self.current())
    }

    fn save(&self, preference: &Preference) -> Result<(), PreferenceError> {
        let mut guard = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(preference.clone());
        Ok(())
    }
}

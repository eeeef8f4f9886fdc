//! Preference Store
//!
//! String key-value store for the settings the user changes at runtime
//! (favourite hosts, toolbar visibility). It is handed to the components
//! that need it instead of living in a global.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Key-value preference storage
pub trait PreferenceStore: Send {
    /// Value stored under `key`, or `default` when absent
    fn get_prop(&self, key: &str, default: &str) -> String;

    /// Store a value and flush it
    fn set_prop(&mut self, key: &str, value: &str) -> Result<()>;

    /// Drop every stored value and flush
    fn clear_prefs(&mut self) -> Result<()>;
}

/// Preferences kept in memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: BTreeMap<String, String>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get_prop(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    fn set_prop(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear_prefs(&mut self) -> Result<()> {
        self.values.clear();
        Ok(())
    }
}

/// Preferences backed by a TOML file.
///
/// The file is read once when the store is opened and rewritten after
/// every change.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferenceStore {
    /// Open the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match Self::read(&path) {
            Ok(values) => values,
            Err(e) => {
                warn!("Starting with empty preferences: {}", e);
                BTreeMap::new()
            }
        };
        debug!(
            "Opened preference store {} with {} entries",
            path.display(),
            values.len()
        );
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> Result<BTreeMap<String, String>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| Error::ConfigParseFailed {
            format: "TOML".to_string(),
            reason: e.to_string(),
        })
    }

    fn flush(&self) -> Result<()> {
        let save_failed = |reason: String| Error::ConfigSaveFailed {
            path: self.path.clone(),
            reason,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }

        let content = toml::to_string(&self.values).map_err(|e| save_failed(e.to_string()))?;
        fs::write(&self.path, content).map_err(|e| save_failed(e.to_string()))
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get_prop(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    fn set_prop(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn clear_prefs(&mut self) -> Result<()> {
        self.values.clear();
        self.flush()
    }
}

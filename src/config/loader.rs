//! Configuration File Loading
//!
//! Finds `config.toml` in the usual places and reads it. A missing file
//! means defaults; a broken file found by searching is logged and skipped.
//! A file named explicitly on the command line must load cleanly.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::AppConfig;
use crate::error::{Error, Result};

const APP_DIR: &str = "openterm";
const CONFIG_FILE: &str = "config.toml";
const PREFS_FILE: &str = "prefs.toml";

/// Configuration file loader
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Candidate config files, highest priority first
    search_paths: Vec<PathBuf>,
    /// File the configuration was read from (if any)
    current_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader over the default search paths
    pub fn new() -> Self {
        Self {
            search_paths: Self::get_search_paths(),
            current_path: None,
        }
    }

    /// Load from the first config file found, falling back to defaults
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidationFailed`] if the loaded values are
    /// out of range.
    pub fn load(&mut self) -> Result<AppConfig> {
        let config = match self.find_config() {
            Some(path) => {
                let config = match Self::load_config_file(&path) {
                    Ok(config) => {
                        info!("Loaded configuration from {}", path.display());
                        config
                    }
                    Err(e) => {
                        warn!("Ignoring configuration at {}: {}", path.display(), e);
                        AppConfig::default()
                    }
                };
                self.current_path = Some(path);
                config
            }
            None => {
                debug!("No configuration file found, using defaults");
                AppConfig::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Load a specific file; unlike [`ConfigLoader::load`] every failure is reported
    pub fn load_explicit(&mut self, path: &Path) -> Result<AppConfig> {
        let config = Self::load_config_file(path)?;
        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        self.current_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn find_config(&self) -> Option<PathBuf> {
        self.search_paths.iter().find(|p| p.is_file()).cloned()
    }

    fn load_config_file(path: &Path) -> Result<AppConfig> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| Error::ConfigParseFailed {
            format: "TOML".to_string(),
            reason: e.to_string(),
        })
    }

    fn get_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(APP_DIR).join(CONFIG_FILE));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".openterm").join(CONFIG_FILE));
        }

        if let Ok(cwd) = env::current_dir() {
            paths.push(cwd.join(".openterm").join(CONFIG_FILE));
        }

        paths
    }

    /// Directory for openterm's own files under the platform config dir
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    /// Where the preference store lives: next to the loaded config file,
    /// otherwise in the default config directory
    pub fn prefs_path(&self) -> PathBuf {
        self.current_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_dir)
            .join(PREFS_FILE)
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Append a lower-priority candidate file
    pub fn add_search_path(&mut self, path: PathBuf) {
        self.search_paths.push(path);
    }

    /// Replace all candidates with a single file
    pub fn set_search_path(&mut self, path: PathBuf) {
        self.search_paths = vec![path];
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

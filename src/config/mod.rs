//! Configuration management for openterm
//!
//! - [`AppConfig`] - static application settings read from `config.toml`
//! - [`loader`] - locating and reading the config file
//! - [`prefs`] - the mutable key-value preference store (favourites,
//!   toolbar state) that is written back on every change

pub mod loader;
pub mod prefs;

pub use loader::ConfigLoader;
pub use prefs::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::display::{NamedColor, FONT_SIZES};
use crate::error::{Error, Result};

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Product name used as the title prefix
    pub product_name: String,

    /// Connect automatically when exactly one host is known at startup
    pub auto_connect: bool,

    /// Running inside a host application; exit must not end the process
    pub embedded: bool,

    /// Seconds to wait for a terminal connect before failing it
    pub connect_timeout_secs: u64,

    /// Protocol tag offered by the new-host prompt
    pub default_protocol: String,

    /// Port offered by the new-host prompt
    pub default_port: u16,

    /// Initial font and colours
    pub display: DisplayConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            product_name: "open.term".to_string(),
            auto_connect: true,
            embedded: false,
            connect_timeout_secs: 30,
            default_protocol: "tn3270".to_string(),
            default_port: 23,
            display: DisplayConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.product_name.trim().is_empty() {
            return Err(Error::ConfigValidationFailed {
                field: "product_name".to_string(),
                reason: "Product name cannot be empty".to_string(),
            });
        }

        if !(1..=600).contains(&self.connect_timeout_secs) {
            return Err(Error::ConfigValidationFailed {
                field: "connect_timeout_secs".to_string(),
                reason: "Connect timeout must be between 1 and 600 seconds".to_string(),
            });
        }

        if self.default_protocol.trim().is_empty() {
            return Err(Error::ConfigValidationFailed {
                field: "default_protocol".to_string(),
                reason: "Default protocol cannot be empty".to_string(),
            });
        }

        if self.default_port == 0 {
            return Err(Error::ConfigValidationFailed {
                field: "default_port".to_string(),
                reason: "Default port must be greater than 0".to_string(),
            });
        }

        if !FONT_SIZES.contains(&self.display.font_size) {
            return Err(Error::ConfigValidationFailed {
                field: "display.font_size".to_string(),
                reason: format!("Font size must be one of {:?}", FONT_SIZES),
            });
        }

        Ok(())
    }
}

/// Initial display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub font_size: u32,
    pub foreground: NamedColor,
    pub bold: NamedColor,
    pub background: NamedColor,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            font_size: 14,
            foreground: NamedColor::Green,
            bold: NamedColor::White,
            background: NamedColor::Black,
        }
    }
}

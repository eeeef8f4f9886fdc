//! Display Preferences
//!
//! Font sizes and colours offered in the Options menu, plus the F-key bar
//! toggle that is remembered in the preference store.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{DisplayConfig, PreferenceStore};
use crate::error::{Error, Result};

/// Font sizes presented to the user
pub const FONT_SIZES: [u32; 15] = [6, 8, 10, 12, 14, 16, 18, 20, 22, 24, 26, 28, 32, 36, 40];

/// Preference key for the F-key toolbar
pub const FKEY_BAR_KEY: &str = "toolbar.fkey.enabled";

/// Colours presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedColor {
    Black,
    White,
    Green,
    Red,
    Blue,
    Orange,
    Turquoise,
    #[serde(rename = "Dark Blue")]
    DarkBlue,
    #[serde(rename = "Light Green")]
    LightGreen,
}

impl NamedColor {
    /// All colours in menu order
    pub const ALL: [NamedColor; 9] = [
        NamedColor::Black,
        NamedColor::White,
        NamedColor::Green,
        NamedColor::Red,
        NamedColor::Blue,
        NamedColor::Orange,
        NamedColor::Turquoise,
        NamedColor::DarkBlue,
        NamedColor::LightGreen,
    ];

    /// Name shown in the menu
    pub fn name(&self) -> &'static str {
        match self {
            NamedColor::Black => "Black",
            NamedColor::White => "White",
            NamedColor::Green => "Green",
            NamedColor::Red => "Red",
            NamedColor::Blue => "Blue",
            NamedColor::Orange => "Orange",
            NamedColor::Turquoise => "Turquoise",
            NamedColor::DarkBlue => "Dark Blue",
            NamedColor::LightGreen => "Light Green",
        }
    }

    /// RGB value
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            NamedColor::Black => (0, 0, 0),
            NamedColor::White => (255, 255, 255),
            NamedColor::Green => (0, 255, 0),
            NamedColor::Red => (255, 0, 0),
            NamedColor::Blue => (0, 0, 255),
            NamedColor::Orange => (255, 200, 0),
            NamedColor::Turquoise => (0, 255, 255),
            NamedColor::DarkBlue => (0, 51, 102),
            NamedColor::LightGreen => (204, 255, 204),
        }
    }
}

impl fmt::Display for NamedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NamedColor {
    type Err = Error;

    /// Case-insensitive; spaces, dashes and underscores are interchangeable
    fn from_str(s: &str) -> Result<Self> {
        let wanted: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();

        NamedColor::ALL
            .iter()
            .copied()
            .find(|color| color.name().replace(' ', "").to_lowercase() == wanted)
            .ok_or_else(|| Error::UnsupportedPreference {
                setting: "colour".to_string(),
                value: s.to_string(),
            })
    }
}

/// Which colour slot a menu choice applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
    Foreground,
    Bold,
    Background,
}

impl FromStr for ColorTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fg" | "font" | "foreground" => Ok(ColorTarget::Foreground),
            "bold" => Ok(ColorTarget::Bold),
            "bg" | "background" => Ok(ColorTarget::Background),
            other => Err(Error::UnsupportedPreference {
                setting: "colour target".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Current font and colour choices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayPreferences {
    pub font_size: u32,
    pub foreground: NamedColor,
    pub bold: NamedColor,
    pub background: NamedColor,
    pub fkey_bar: bool,
}

impl Default for DisplayPreferences {
    fn default() -> Self {
        Self::from_config(&DisplayConfig::default())
    }
}

impl DisplayPreferences {
    /// Start from configured defaults
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self {
            font_size: config.font_size,
            foreground: config.foreground,
            bold: config.bold,
            background: config.background,
            fkey_bar: false,
        }
    }

    /// Start from configured defaults, then apply remembered preferences
    pub fn load(config: &DisplayConfig, prefs: &dyn PreferenceStore) -> Self {
        let mut preferences = Self::from_config(config);
        preferences.fkey_bar = prefs.get_prop(FKEY_BAR_KEY, "false") == "true";
        preferences
    }

    /// Choose one of the offered font sizes
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPreference`] for sizes not in [`FONT_SIZES`].
    pub fn set_font_size(&mut self, size: u32) -> Result<()> {
        if !FONT_SIZES.contains(&size) {
            return Err(Error::UnsupportedPreference {
                setting: "font size".to_string(),
                value: size.to_string(),
            });
        }
        self.font_size = size;
        Ok(())
    }

    pub fn set_color(&mut self, target: ColorTarget, color: NamedColor) {
        match target {
            ColorTarget::Foreground => self.foreground = color,
            ColorTarget::Bold => self.bold = color,
            ColorTarget::Background => self.background = color,
        }
    }

    /// Toggle the F-key bar and remember the choice
    pub fn set_fkey_bar(&mut self, enabled: bool, prefs: &mut dyn PreferenceStore) -> Result<()> {
        self.fkey_bar = enabled;
        prefs.set_prop(FKEY_BAR_KEY, if enabled { "true" } else { "false" })
    }
}

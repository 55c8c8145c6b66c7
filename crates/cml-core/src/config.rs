//! Editor configuration.
//!
//! Every section is `#[serde(default)]`, so a config file only needs the
//! keys it changes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Autocomplete behavior
    pub editor: EditorConfig,

    /// Popup placement and appearance
    pub popup: PopupConfig,

    /// Highlight markup
    pub highlight: HighlightConfig,
}

impl Config {
    /// Loads config from the default location, falling back to defaults.
    pub fn load() -> Self {
        match Self::load_from_default_path() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config: {}", e);
                Self::default()
            }
        }
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("cml-studio").join("config.toml"))
    }

    /// Writes the config as TOML.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Autocomplete behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Shortest bare word that opens the popup
    pub min_word_len: usize,

    /// Delay before a blur hides the popup, in ms
    pub blur_grace_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_word_len: 2,
            blur_grace_ms: 300,
        }
    }
}

/// Popup placement.
///
/// The anchor is estimated from fixed glyph metrics, which only holds for
/// a monospaced, fixed-size text area.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupConfig {
    /// Line height in px
    pub line_height: u32,

    /// Character cell width in px
    pub char_width: u32,

    /// Row color for suggestions that carry none
    pub default_color: String,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            line_height: 24,
            char_width: 8,
            default_color: "black".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Prefix for span classes, e.g. `syntax-keyword`
    pub class_prefix: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            class_prefix: "syntax-".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

//! Editor configuration.
//!
//! Loaded from `config.toml` under the platform config directory. Every
//! section is `#[serde(default)]`, so a file only needs the keys it
//! overrides and older files keep loading as fields are added.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::geometry::Color;

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Surface font and viewport settings
    pub editor: EditorConfig,

    /// Line-number gutter metrics and colours
    pub gutter: GutterConfig,

    /// Window chrome
    pub window: WindowConfig,

    /// File handling
    pub files: FileConfig,
}

impl Config {
    /// Loads config from the default location, falling back to defaults.
    pub fn load() -> Self {
        match Self::load_from_default_path() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Using default config: {}", err);
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
        Ok(config_dir.join("scribe").join("config.toml"))
    }

    /// Writes the config to `path`, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Surface configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Font size in points
    pub font_size: f32,

    /// Line height as a multiple of the font size
    pub line_height_factor: f32,

    /// Tab stop width in columns when lines are laid out for display
    pub tab_size: usize,

    /// Points added or removed per zoom step
    pub zoom_step: f32,

    /// Initial viewport width in pixels
    pub viewport_width: i32,

    /// Initial viewport height in pixels
    pub viewport_height: i32,

    /// Undo steps kept per document
    pub undo_limit: usize,
}

impl EditorConfig {
    /// Pixel height of one line at `font_size`.
    pub fn line_height_for(&self, font_size: f32) -> i32 {
        ((font_size * self.line_height_factor).round() as i32).max(1)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            font_size: 13.0,
            line_height_factor: 1.4,
            tab_size: 4,
            zoom_step: 2.0,
            viewport_width: 1200,
            viewport_height: 800,
            undo_limit: 1000,
        }
    }
}

/// Gutter metrics and palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GutterConfig {
    /// Horizontal advance of one digit, in pixels
    pub digit_width: i32,

    /// Fixed padding added to the digit run
    pub padding: i32,

    /// Gap between the right-aligned numbers and the text
    pub number_margin: i32,

    pub background: Color,
    pub foreground: Color,
    pub foreground_dim: Color,

    /// Background of the caret line inside the surface
    pub current_line: Color,
}

impl Default for GutterConfig {
    fn default() -> Self {
        Self {
            digit_width: 8,
            padding: 16,
            number_margin: 8,
            background: Color::rgb(30, 31, 28),
            foreground: Color::rgb(248, 248, 242),
            foreground_dim: Color::rgb(117, 113, 94),
            current_line: Color::rgb(50, 50, 45),
        }
    }
}

/// Window chrome configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Suffix shown after the active document in the window title
    pub app_name: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            app_name: "Markdown Editor".to_string(),
        }
    }
}

/// File handling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Resolve user-supplied paths before opening, so the same file reached
    /// through different spellings maps to one tab
    pub canonicalize_paths: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            canonicalize_paths: true,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.gutter.padding, 16);
        assert_eq!(config.window.app_name, "Markdown Editor");
        assert_eq!(config.editor.line_height_for(13.0), 18);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r##"
            [gutter]
            digit_width = 1
            foreground = "#ffffff"
            "##,
        )
        .unwrap();

        assert_eq!(config.gutter.digit_width, 1);
        assert_eq!(config.gutter.foreground, Color::rgb(255, 255, 255));
        assert_eq!(config.gutter.padding, 16);
        assert_eq!(config.editor.tab_size, 4);
    }

    #[test]
    fn test_invalid_colour_is_rejected() {
        let result: Result<Config, _> = toml::from_str("[gutter]\nbackground = \"navy\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scribe").join("config.toml");

        let mut config = Config::default();
        config.window.app_name = "Notes".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.window.app_name, "Notes");
        assert_eq!(loaded.gutter, config.gutter);
    }
}

//! Configuration for toolpath parsing and preview display
//!
//! Configuration is organized into two sections:
//! - Parser settings (layer-change epsilon, short-line threshold)
//! - Display settings (ghost/active/marker colors, progress slider resolution)
//!
//! Files are JSON or TOML, selected by extension.

use crate::error::{ConfigError, SettingsResult};
use layerscrub_core::constants::{MIN_LINE_LENGTH, PROGRESS_SLIDER_STEPS, Z_EPSILON_MM};
use layerscrub_core::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_DIR_NAME: &str = "layerscrub";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Toolpath parser settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSettings {
    /// Z difference (mm) above which a move opens a new layer
    pub z_epsilon: f64,
    /// Lines shorter than this (bytes) are skipped
    pub min_line_length: usize,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            z_epsilon: Z_EPSILON_MM,
            min_line_length: MIN_LINE_LENGTH,
        }
    }
}

/// Preview display settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Color of already-printed (ghost) layers
    pub ghost_color: Color,
    /// Color of the layer being scrubbed
    pub active_color: Color,
    /// Color of the nozzle position marker
    pub marker_color: Color,
    /// Mark ghost geometry as locked (not selectable) in the scene
    pub lock_ghosts: bool,
    /// Number of discrete positions on the progress slider
    pub progress_steps: u32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            ghost_color: Color::GHOST_GRAY,
            active_color: Color::RED,
            marker_color: Color::BLUE,
            lock_ghosts: true,
            progress_steps: PROGRESS_SLIDER_STEPS,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub parser: ParserSettings,
    pub display: DisplaySettings,
}

enum Format {
    Json,
    Toml,
}

fn format_for(path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-user config file location, e.g. `~/.config/layerscrub/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDirectory)
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_for(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise return defaults
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_for(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.parser.z_epsilon.is_finite() && self.parser.z_epsilon > 0.0) {
            return Err(ConfigError::ValueOutOfRange {
                key: "parser.z_epsilon".to_string(),
                value: self.parser.z_epsilon.to_string(),
            });
        }

        if self.parser.min_line_length == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "parser.min_line_length".to_string(),
                value: "0".to_string(),
            });
        }

        if self.display.progress_steps == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "display.progress_steps".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SettingsError;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.parser.z_epsilon, 0.001);
        assert_eq!(config.parser.min_line_length, 3);
        assert_eq!(config.display.ghost_color, Color::rgb(80, 80, 80));
        assert_eq!(config.display.active_color, Color::RED);
        assert_eq!(config.display.marker_color, Color::BLUE);
        assert_eq!(config.display.progress_steps, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::new();
        config.parser.z_epsilon = 0.01;
        config.display.lock_ghosts = false;
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display]\nprogress_steps = 200\n").unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.display.progress_steps, 200);
        assert_eq!(loaded.display.marker_color, Color::BLUE);
        assert_eq!(loaded.parser, ParserSettings::default());
    }

    #[test]
    fn test_json_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"parser": {"z_epsilon": 0.005}}"#).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.parser.z_epsilon, 0.005);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = Config::load_from_file(Path::new("config.yaml"));
        assert!(matches!(
            result,
            Err(SettingsError::Config(ConfigError::UnsupportedFormat(ext))) if ext == "yaml"
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::new();
        config.parser.z_epsilon = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.display.progress_steps = 0;
        assert!(config.validate().is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[parser]\nmin_line_length = 0\n").unwrap();
        assert!(Config::load_from_file(&path).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}

//! layerscrub Settings Crate
//!
//! Handles parser and display configuration and its persistence.

pub mod config;
pub mod error;

pub use config::{Config, DisplaySettings, ParserSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};

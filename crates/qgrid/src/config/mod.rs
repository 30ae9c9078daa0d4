//! Configuration module for qgrid.
//!
//! Handles loading and managing configuration from:
//! - Default values
//! - Config file (~/.config/qgrid/config.toml)
//! - Environment variables

mod keymap;
mod schema;

pub use keymap::{Action, KeyBinding, Keymap};
pub use schema::{
    ClipboardBackend, ClipboardConfig, Config, CustomKeyBinding, DisplayConfig, GridConfig,
    KeymapConfig,
};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Returns the config directory path.
///
/// Checks `QGRID_CONFIG_DIR` environment variable first, then falls back
/// to the system default (~/.config/qgrid on Linux/macOS).
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("QGRID_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|p| p.join("qgrid"))
}

/// Returns the default config file path (~/.config/qgrid/config.toml)
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}

/// Returns the log file path (~/.config/qgrid/qgrid.log)
pub fn log_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("qgrid.log"))
}

/// Load configuration from the default path or return defaults
pub fn load_config() -> Result<Config> {
    if let Some(path) = config_path() {
        if path.exists() {
            return load_config_from(&path);
        }
    }
    Ok(Config::default())
}

/// Load configuration from a specific path
pub fn load_config_from(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

impl Config {
    /// The grid keymap with the user's `[[keymap.grid]]` entries applied.
    pub fn grid_keymap(&self) -> Keymap {
        let mut km = Keymap::default_grid_keymap();
        for warning in km.apply_custom(&self.keymap.grid) {
            tracing::warn!("{}", warning);
        }
        km
    }
}

//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Display settings
    pub display: DisplayConfig,
    /// Grid interaction settings
    pub grid: GridConfig,
    /// Clipboard backend settings
    pub clipboard: ClipboardConfig,
    /// Keymap customizations
    pub keymap: KeymapConfig,
}

/// Display-related settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show the sticky row-number column
    pub show_row_numbers: bool,
    /// Minimum column width
    pub min_column_width: u16,
    /// Maximum column width
    pub max_column_width: u16,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_row_numbers: true,
            min_column_width: 3,
            max_column_width: 40,
        }
    }
}

/// Grid interaction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Two presses on the same cell within this many milliseconds open the editor
    pub double_click_ms: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            double_click_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ClipboardBackend {
    #[default]
    Auto,
    Arboard,
    WlCopy,
    Disabled,
}

/// Clipboard settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    pub backend: ClipboardBackend,
    /// Command used for the wl-copy backend
    pub wl_copy_cmd: String,
    /// Copy into the primary selection instead of the clipboard
    pub wl_copy_primary: bool,
    /// Pass `-n` so wl-copy does not add a trailing newline
    pub wl_copy_trim_newline: bool,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            backend: ClipboardBackend::Auto,
            wl_copy_cmd: "wl-copy".to_string(),
            wl_copy_primary: false,
            wl_copy_trim_newline: false,
        }
    }
}

/// Keymap customization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeymapConfig {
    /// Custom keybindings for grid navigation
    pub grid: Vec<CustomKeyBinding>,
}

/// A custom keybinding definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomKeyBinding {
    /// Key combination (e.g., "ctrl+c", "f2", "super+;")
    pub key: String,
    /// Action to perform
    pub action: String,
    /// Optional description for help display
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[display]
show_row_numbers = false
max_column_width = 60

[grid]
double_click_ms = 400

[clipboard]
backend = "wl-copy"
wl_copy_primary = true

[[keymap.grid]]
key = "ctrl+f"
action = "add_where_clause"
description = "Filter by cell"
"#;

        let config: Config = toml::from_str(toml).unwrap();

        assert!(!config.display.show_row_numbers);
        assert_eq!(config.display.max_column_width, 60);
        assert_eq!(config.display.min_column_width, 3);

        assert_eq!(config.grid.double_click_ms, 400);

        assert_eq!(config.clipboard.backend, ClipboardBackend::WlCopy);
        assert!(config.clipboard.wl_copy_primary);
        assert_eq!(config.clipboard.wl_copy_cmd, "wl-copy");

        assert_eq!(config.keymap.grid.len(), 1);
        assert_eq!(config.keymap.grid[0].key, "ctrl+f");
        assert_eq!(
            config.keymap.grid[0].description.as_deref(),
            Some("Filter by cell")
        );
    }

    #[test]
    fn test_unknown_backend_is_an_error() {
        let toml = r#"
[clipboard]
backend = "pasteboard"
"#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn test_serialize_config() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[display]"));
        assert!(toml_str.contains("[grid]"));
        assert!(toml_str.contains("[clipboard]"));
    }
}

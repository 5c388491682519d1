//! Configuration management for Swipedia.
//!
//! Configuration is read from `~/.config/swipedia/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod colors;
pub mod keybindings;

pub use colors::ColorConfig;
pub use keybindings::KeybindingConfig;

use crate::feed::FeedConfig;
use crate::gesture::GestureConfig;
use crate::source::SourceConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration struct. Every section falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub feed: FeedConfig,
    pub gesture: GestureConfig,
    pub colors: ColorConfig,
    pub keybindings: KeybindingConfig,
}

impl Config {
    /// Load from the default path, writing a commented default file first if
    /// none exists.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_config_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// `~/.config/swipedia/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("swipedia").join("config.toml"))
    }

    /// `~/.local/share/swipedia` or the platform equivalent; created on demand.
    pub fn data_dir() -> Result<PathBuf, ConfigError> {
        let dir = dirs::data_dir()
            .ok_or(ConfigError::NoDataDir)?
            .join("swipedia");
        fs::create_dir_all(&dir).map_err(|e| ConfigError::Io {
            path: dir.clone(),
            source: e,
        })?;
        Ok(dir)
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(path, Self::default_config_content()).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn default_config_content() -> &'static str {
        r##"# Swipedia Configuration
#
# Colors can be specified as:
# - Named colors: Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray,
#   DarkGray, LightRed, LightGreen, LightYellow, LightBlue, LightMagenta,
#   LightCyan, White, Reset
# - Hex colors: "#RRGGBB" or "#RGB"
#
# Keybindings can be specified as:
# - Single characters: "a", "A", "/"
# - Special keys: Enter, Tab, BackTab, Backspace, Delete, Home, End,
#   PageUp, PageDown, Up, Down, Left, Right, Esc, Space, F1-F12
# - With modifiers: "Ctrl+c", "Shift+Tab", "Alt+Enter"

[source]
api_base = "https://en.wikipedia.org/api/rest_v1"
action_api = "https://en.wikipedia.org/w/api.php"
site_base = "https://en.wikipedia.org"

# Per-request timeout in seconds
timeout_secs = 15

# Maximum concurrent requests while prefetching
max_concurrency = 5

[feed]
# Random articles fetched per batch
batch_size = 5

# Fetch more once fewer than this many unseen articles remain
low_watermark = 3

[gesture]
# Drag distance (units) that commits a like, skip or deep dive
swipe_threshold = 100.0

# Horizontal flick speed (units per second) that commits regardless of distance
velocity_threshold = 500.0

# Movement (units) still treated as a click
tap_threshold = 10.0

# Units per terminal column and row when dragging with the mouse
cell_width = 10.0
cell_height = 25.0

[colors]
border = "DarkGray"
drag_border = "Cyan"
selection_bg = "Cyan"
selection_fg = "Black"
title = "White"
extract = "Gray"
heading = "Yellow"
link = "Blue"
like = "Green"
skip = "Red"
saved_marker = "Yellow"
error = "LightRed"
status_fg = "White"
status_bg = "DarkGray"

[keybindings]
# Swiping
like = ["Right", "l"]
skip = ["Left", "h"]
deep_dive = ["Down", "Enter"]

# Navigation
quit = ["q", "Ctrl+c"]
back = ["Esc", "Backspace"]
toggle_view = ["Tab"]
move_up = ["k", "Up"]
move_down = ["j"]
next_page = ["n", "PageDown"]
prev_page = ["p", "PageUp"]

# Actions
toggle_save = ["s"]
open_in_browser = ["o"]
retry = ["r"]
remove_saved = ["d", "Delete"]
search = ["/"]
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn test_default_config_deserializes() {
        let config: Config = toml::from_str(Config::default_config_content())
            .expect("Default config should be valid TOML");

        assert_eq!(config.source.timeout_secs, 15);
        assert_eq!(config.feed.batch_size, 5);
        assert_eq!(config.feed.low_watermark, 3);
        assert_eq!(config.gesture.swipe_threshold, 100.0);
        assert_eq!(config.colors.like, Color::Green);
        assert_eq!(config.keybindings.like, vec!["Right", "l"]);
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[feed]
batch_size = 8

[colors]
like = "#00FF00"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.feed.batch_size, 8);
        assert_eq!(config.feed.low_watermark, 3);
        assert_eq!(config.colors.like, Color::Rgb(0, 255, 0));
        assert_eq!(config.colors.skip, Color::Red);
        assert!(config.source.user_agent.starts_with("swipedia/"));
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.source.api_base, "https://en.wikipedia.org/api/rest_v1");
        assert_eq!(config.keybindings.quit, vec!["q", "Ctrl+c"]);
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        let content = "[colors]\nlike = \"ultraviolet\"\n";
        assert!(toml::from_str::<Config>(content).is_err());
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.feed.batch_size, 5);
        assert!(path.exists());

        // The written file loads back.
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.gesture.tap_threshold, 10.0);
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[feed\nbatch_size = ").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}

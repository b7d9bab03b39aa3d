//! Shell configuration.
//!
//! Every section is `#[serde(default)]`, so a config file only needs the keys
//! it wants to change.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application name used for config and cache directories.
const APP_NAME: &str = "pocketcode";

/// Main shell configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Open-file handling
    pub session: SessionConfig,

    /// Selection handle overlay
    pub overlay: OverlayConfig,
}

impl Config {
    /// Loads config from the default location, falling back to defaults.
    pub fn load() -> Self {
        match Self::load_from_default_path() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Ignoring unreadable config: {}", err);
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
        Ok(config_dir.join(APP_NAME).join("config.toml"))
    }
}

/// Open-file handling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Quiet period after the last edit before the unsaved-change check runs
    pub debounce_ms: u64,

    /// Name given to the fallback session
    pub default_file_name: String,

    /// Where session mirrors live (defaults to the user cache directory)
    pub mirror_dir: Option<PathBuf>,

    /// Where the open-file list is shown
    pub file_list_position: FileListPosition,

    /// Subtitles longer than this are truncated from the left
    pub subtitle_max_len: usize,
}

impl SessionConfig {
    /// Returns the debounce delay.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Returns the mirror directory, resolving the default.
    pub fn mirror_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.mirror_dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let cache = dirs::cache_dir().ok_or(ConfigError::NoCacheDir)?;
                Ok(cache.join(APP_NAME).join("session"))
            }
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            default_file_name: "untitled.txt".to_string(),
            mirror_dir: None,
            file_list_position: FileListPosition::Sidebar,
            subtitle_max_len: 30,
        }
    }
}

/// Placement of the open-file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileListPosition {
    /// Collapsible list at the top of the sidebar
    #[default]
    Sidebar,
    /// Horizontal strip in the header
    Header,
}

/// Selection handle overlay configuration. All values are in screen pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Vertical lift applied to drag points so the finger does not hide the
    /// insertion point
    pub finger_offset: f32,

    /// Space kept between the end handle's line and the menu, on top of one
    /// line height
    pub menu_gap: f32,

    /// Horizontal space reserved at the right edge of the viewport
    pub viewport_margin: f32,

    /// Menu top used when the menu would render above the viewport
    pub menu_min_top: f32,

    /// Horizontal nudge of the start handle
    pub start_nudge: f32,

    /// Horizontal nudge of the end handle
    pub end_nudge: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            finger_offset: 28.0,
            menu_gap: 40.0,
            viewport_margin: 40.0,
            menu_min_top: 50.0,
            start_nudge: 1.0,
            end_nudge: 4.0,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("Cache directory not found")]
    NoCacheDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

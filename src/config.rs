//! Configuration for the emulated terminal

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::DEFAULT_TAB_WIDTH;

/// Terminal configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Grid width in columns
    pub cols: usize,
    /// Grid height in rows
    pub rows: usize,
    /// Maximum scrollback lines (0 disables scrollback)
    pub scrollback_lines: usize,
    /// Distance between tab stops
    pub tab_width: usize,
    /// Initial state of DECAWM
    pub autowrap: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            cols: 80,
            rows: 24,
            scrollback_lines: 1000,
            tab_width: DEFAULT_TAB_WIDTH,
            autowrap: true,
        }
    }
}

impl TerminalConfig {
    /// Config with the given dimensions and defaults elsewhere
    pub fn with_size(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            ..Self::default()
        }
    }

    /// Reject zero-sized grids and tab stops
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(ConfigError::InvalidSize {
                cols: self.cols,
                rows: self.rows,
            });
        }
        if self.tab_width == 0 {
            return Err(ConfigError::InvalidTabWidth);
        }
        Ok(())
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: TerminalConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from the default location or return the default config
    pub fn load_or_default() -> Self {
        let Some(path) = default_config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "ignoring unreadable config");
                Self::default()
            }
        }
    }
}

/// `~/.config/hexterm/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("hexterm")
            .join("config.json")
    })
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid terminal size {cols}x{rows}")]
    InvalidSize { cols: usize, rows: usize },
    #[error("tab width must be at least 1")]
    InvalidTabWidth,
}

//! Shell configuration.
//!
//! Loaded from a RON file, by default `~/.config/mollusk/config.ron`. Every
//! field is optional in the file; missing ones take their defaults.
//!
//! ```ron
//! (
//!     user: "ada",
//!     host: "lovelace",
//!     capacity: Some(4096),
//!     state_path: "saves/filesys.json",
//! )
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use mollusk_fs::{DEFAULT_CACHE_SLOTS, DEFAULT_ROOT_NAME};

/// Commands kept in history.
pub const DEFAULT_HISTORY_LIMIT: usize = 32;

/// Error type for config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Everything the shell needs to start a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Player name shown in the prompt.
    pub user: String,
    /// Name of the home host.
    pub host: String,
    /// Name given to a fresh root directory.
    pub root_name: String,
    /// Byte budget for a fresh root; `None` is unbounded.
    pub capacity: Option<usize>,
    pub cache_slots: usize,
    /// Filesystem state file.
    pub state_path: PathBuf,
    /// Cache state file.
    pub cache_path: PathBuf,
    pub history_limit: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            user: "guest".to_string(),
            host: "localhost".to_string(),
            root_name: DEFAULT_ROOT_NAME.to_string(),
            capacity: None,
            cache_slots: DEFAULT_CACHE_SLOTS,
            state_path: PathBuf::from("filesys.json"),
            cache_path: PathBuf::from("cache.json"),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Get the config file path (~/.config/mollusk/config.ron).
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("mollusk").join("config.ron"))
}

impl ShellConfig {
    /// Parse a config from RON text.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    /// Load `path`, or the default location when `None`.
    ///
    /// A missing file gives the defaults. An unreadable or malformed file
    /// also gives the defaults, with a warning.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match config_file_path() {
                Some(path) => path,
                None => {
                    tracing::info!("No config directory available, using default config");
                    return Self::default();
                }
            },
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config");
                config
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "bad config, using defaults: {e}");
                Self::default()
            }
        }
    }
}

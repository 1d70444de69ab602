//! User configuration.
//!
//! Read from `$XDG_CONFIG_HOME/inkpad/config.json`. A missing or unreadable
//! file falls back to defaults rather than failing startup.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use inkpad_core::{DEFAULT_MAX_VERSIONS, DEFAULT_TITLE};
use serde::{Deserialize, Serialize};

/// Edits between automatic "Auto-save" versions
pub const DEFAULT_AUTOSNAPSHOT_EVERY: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding one JSON file per document
    pub data_dir: PathBuf,
    /// Capacity of each document's version log
    pub max_versions: usize,
    /// Undo depth; unbounded when absent
    pub history_limit: Option<usize>,
    /// Take an automatic version every N edits (0 disables)
    pub autosnapshot_every: usize,
    /// Title given to new documents
    pub default_title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_versions: DEFAULT_MAX_VERSIONS,
            history_limit: None,
            autosnapshot_every: DEFAULT_AUTOSNAPSHOT_EVERY,
            default_title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl Config {
    /// Load from the default config location
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Load from `path`, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::read(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Save to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        });
    config_dir.join("inkpad").join("config.json")
}

/// Get the default directory for stored documents
pub fn default_data_dir() -> PathBuf {
    // Use XDG data directory if available, otherwise fallback to ~/.local/share
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local/share")
        });
    data_dir.join("inkpad").join("documents")
}

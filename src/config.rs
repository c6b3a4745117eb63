//! Startup settings.
//!
//! Read from `<config dir>/passvault/settings.toml`. A missing file simply
//! means defaults: a file-backed database in the user's data directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::db::{default_db_path, Location, APP_NAME};

const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Which connection target the process uses. Decided once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// Durable SQLite file.
    #[default]
    File,
    /// Scratch in-memory database, gone when the process exits.
    Memory,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: StorageMode,
    /// Overrides the default database file. Ignored in memory mode.
    pub database_path: Option<PathBuf>,
}

impl Settings {
    /// Load from the default settings file, falling back to defaults when it
    /// does not exist.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("no config directory available, using default settings");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "settings file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file: {}", path.display()))?;
        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("failed to parse settings file: {}", path.display()))?;

        info!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }

    /// Location of the settings file for this user.
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join(SETTINGS_FILE_NAME))
    }

    /// Translate the settings into a store location.
    pub fn location(&self) -> Result<Location> {
        match self.mode {
            StorageMode::Memory => Ok(Location::Memory),
            StorageMode::File => self
                .database_path
                .clone()
                .or_else(default_db_path)
                .map(Location::File)
                .ok_or_else(|| anyhow!("could not locate a data directory for the database")),
        }
    }
}

//! Optional settings file. Every key has a default, so a missing file (the
//! common case) behaves exactly like an empty one.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Application folder name handed to `ProjectDirs`.
const APP_NAME: &str = "library-manager";
/// SQLite file name stored inside the data directory.
const DB_FILE_NAME: &str = "library.db";
const LOG_FILE_NAME: &str = "library-manager.log";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the book table lives.
    pub database_path: PathBuf,
    /// Diagnostics go here; the terminal belongs to the UI.
    pub log_file: PathBuf,
    /// Filter directive for the log file, e.g. `info` or `library_manager=debug`.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_default();

        Self {
            database_path: data_dir.join(DB_FILE_NAME),
            log_file: data_dir.join(LOG_FILE_NAME),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Platform config path, e.g. `~/.config/library-manager/config.toml`.
    pub fn config_path() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_default()
            .join(CONFIG_FILE_NAME)
    }

    /// Load the platform config file, falling back to defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from a specific path, falling back to defaults when the
    /// file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    #[cfg(test)]
    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("failed to create config directory")?;
        }
        let contents = toml::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(path, contents).context("failed to write config file")
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

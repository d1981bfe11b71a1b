//! Settings and configuration utilities.
//!
//! Settings are read from `$HOME/.distro-changelog/settings.json` and act as a
//! fallback for environment variables such as `GITHUB_TOKEN`.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Directory under `$HOME` holding the settings file.
const SETTINGS_DIR: &str = ".distro-changelog";

/// Settings loaded from `$HOME/.distro-changelog/settings.json`.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Environment variable overrides.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads settings from the default location.
    pub fn load() -> Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Self::load_from_path(&settings_path)
    }

    /// Loads settings from a specific path.
    ///
    /// A missing file yields empty settings.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        debug!(path = %path.display(), "Loaded settings file");

        serde_json::from_str::<Self>(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Returns the default settings path.
    pub fn get_settings_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home_dir.join(SETTINGS_DIR).join("settings.json"))
    }

    /// Returns an environment variable with fallback to settings.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        env::var(key).ok().or_else(|| self.env.get(key).cloned())
    }
}

/// Returns an environment variable with fallback to the settings file.
///
/// An unreadable settings file only surfaces when the variable is unset.
pub fn get_env_var(key: &str) -> Result<String> {
    let not_found = || anyhow::anyhow!("Environment variable not found: {key}");
    match Settings::load() {
        Ok(settings) => settings.get_env_var(key).ok_or_else(not_found),
        Err(err) => env::var(key).map_err(|_| not_found().context(err)),
    }
}

/// Tries multiple environment variables with fallback to the settings file.
pub fn get_env_vars(keys: &[&str]) -> Result<String> {
    keys.iter()
        .find_map(|key| get_env_var(key).ok())
        .ok_or_else(|| anyhow::anyhow!("None of the environment variables found: {keys:?}"))
}

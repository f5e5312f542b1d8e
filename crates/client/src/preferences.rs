//! Locally persisted display preferences.

use std::path::{Path, PathBuf};

use entities::Theme;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error("Failed to read preferences file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse preferences file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config directory not found")]
    NoConfigDir,
}

pub type PreferenceResult<T> = Result<T, PreferenceError>;

/// Contents of the preferences file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPreferences {
    #[serde(default)]
    pub theme: Theme,
}

/// Reads and writes `preferences.toml`.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    /// Opens the store under the user's config directory
    /// (`<config_dir>/taskflow/preferences.toml`).
    pub fn open_default() -> PreferenceResult<Self> {
        let dir = dirs::config_dir()
            .map(|p| p.join("taskflow"))
            .ok_or(PreferenceError::NoConfigDir)?;
        Ok(Self::at(dir.join("preferences.toml")))
    }

    /// Uses an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads preferences, falling back to defaults when the file is missing.
    pub fn load(&self) -> PreferenceResult<LocalPreferences> {
        if !self.path.exists() {
            return Ok(LocalPreferences::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Writes preferences, creating the parent directory if needed.
    pub fn save(&self, preferences: &LocalPreferences) -> PreferenceResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(preferences)?;
        std::fs::write(&self.path, content)?;
        tracing::debug!(path = %self.path.display(), "Saved preferences");
        Ok(())
    }

    /// The saved theme, light when nothing was saved.
    pub fn theme(&self) -> PreferenceResult<Theme> {
        Ok(self.load()?.theme)
    }

    pub fn set_theme(&self, theme: Theme) -> PreferenceResult<()> {
        let mut preferences = self.load()?;
        preferences.theme = theme;
        self.save(&preferences)
    }
}

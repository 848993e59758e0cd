//! Loading and saving config.toml

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::settings::AppSettings;
use super::{SettingsError, SettingsResult};
use crate::store::atomic_write;
use crate::trace_operation_debug;
use crate::tracing::span_names;

/// Settings file name inside the configuration directory
pub const CONFIG_FILE: &str = "config.toml";

/// Directory name under the platform configuration directory
const APP_DIR: &str = "aab";

/// Configuration manager
///
/// Settings live in `~/.config/aab/` by default.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a manager for the default configuration directory
    ///
    /// # Errors
    ///
    /// Returns `NoConfigDir` if the platform has no configuration directory.
    pub fn new() -> SettingsResult<Self> {
        let config_dir = dirs::config_dir()
            .ok_or(SettingsError::NoConfigDir)?
            .join(APP_DIR);
        Ok(Self { config_dir })
    }

    /// Creates a manager for a custom configuration directory
    #[must_use]
    pub const fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Returns the configuration directory path
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Returns the settings file path
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Creates the configuration directory if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_config_dir(&self) -> SettingsResult<()> {
        fs::create_dir_all(&self.config_dir).map_err(|source| SettingsError::Write {
            path: self.config_dir.clone(),
            source,
        })
    }

    /// Loads application settings
    ///
    /// Returns defaults if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// holds invalid values.
    pub fn load_settings(&self) -> SettingsResult<AppSettings> {
        let path = self.settings_path();
        let _span =
            trace_operation_debug!(span_names::CONFIG_LOAD, path = %path.display()).entered();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No settings file, using defaults");
                return Ok(AppSettings::default());
            }
            Err(source) => return Err(SettingsError::Read { path, source }),
        };

        let settings: AppSettings =
            toml::from_str(&content).map_err(|e| SettingsError::Parse {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Saves application settings
    ///
    /// Creates the configuration directory if it doesn't exist. The file is
    /// replaced atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or the file cannot be
    /// written.
    pub fn save_settings(&self, settings: &AppSettings) -> SettingsResult<()> {
        let path = self.settings_path();
        let _span =
            trace_operation_debug!(span_names::CONFIG_SAVE, path = %path.display()).entered();

        settings.validate()?;
        self.ensure_config_dir()?;
        let content = toml::to_string_pretty(settings)
            .map_err(|e| SettingsError::Serialize(e.to_string()))?;
        atomic_write(&path, content.as_bytes())
            .map_err(|source| SettingsError::Write { path, source })
    }
}

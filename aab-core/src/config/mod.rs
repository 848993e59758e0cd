//! Application settings
//!
//! [`ConfigManager`] loads and saves [`AppSettings`] as TOML, by default
//! from `~/.config/aab/config.toml`.

mod manager;
mod settings;

use std::path::PathBuf;

use thiserror::Error;

pub use manager::{CONFIG_FILE, ConfigManager};
pub use settings::{AppSettings, LoggingSettings, SecuritySettings};

/// Errors that can occur while loading or saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The platform has no configuration directory
    #[error("Configuration directory not found")]
    NoConfigDir,

    /// Reading the settings file failed
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        /// Settings file
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for [`AppSettings`]
    #[error("Failed to parse {}: {reason}", .path.display())]
    Parse {
        /// Settings file
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// The settings parse but hold an unusable value
    #[error("Invalid setting {field}: {reason}")]
    Invalid {
        /// Dotted name of the setting
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// Serializing the settings failed
    #[error("Failed to serialize settings: {0}")]
    Serialize(String),

    /// Writing the settings file failed
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        /// Settings file or directory
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
}

/// Result type for settings operations
pub type SettingsResult<T> = Result<T, SettingsError>;

//! Application settings model stored in config.toml

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::crypto::{EncryptionMode, KdfParams};
use crate::tracing::{TracingConfig, TracingLevel, TracingOutput};

use super::{SettingsError, SettingsResult};

/// Application-wide settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Encryption defaults for new books
    #[serde(default)]
    pub security: SecuritySettings,
    /// Diagnostic logging
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppSettings {
    /// Checks values that parse but cannot be used
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Invalid` naming the offending setting.
    pub fn validate(&self) -> SettingsResult<()> {
        self.security
            .kdf
            .validate()
            .map_err(|reason| SettingsError::Invalid {
                field: "security.kdf".to_string(),
                reason,
            })
    }
}

/// Encryption defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecuritySettings {
    /// Encryption for newly created books
    #[serde(default = "default_encryption")]
    pub default_encryption: EncryptionMode,
    /// Argon2id cost used when saving encrypted books
    #[serde(default)]
    pub kdf: KdfParams,
}

const fn default_encryption() -> EncryptionMode {
    EncryptionMode::ChaCha20Poly1305
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            default_encryption: default_encryption(),
            kdf: KdfParams::default(),
        }
    }
}

/// Diagnostic logging settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level written
    #[serde(default)]
    pub level: TracingLevel,
    /// Log file; stderr when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl LoggingSettings {
    /// Builds the tracing configuration these settings describe
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        let output = self
            .file
            .clone()
            .map_or(TracingOutput::Stderr, TracingOutput::File);
        TracingConfig::default()
            .with_level(self.level)
            .with_output(output)
    }
}

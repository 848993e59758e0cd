//! CLI error types and exit codes.

use aab_core::{ConfigError, OpenError, SaveError, SettingsError, StoreError, ValidationError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - I/O, validation, configuration or lookup failures
    pub const GENERAL_ERROR: i32 = 1;
    /// Wrong or missing password, or a tampered file
    pub const AUTHENTICATION_FAILURE: i32 = 2;
    /// Unknown, unsupported or corrupted file format
    pub const FORMAT_ERROR: i32 = 3;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Opening the address book failed
    #[error(transparent)]
    Open(#[from] OpenError),

    /// Saving the address book failed
    #[error(transparent)]
    Save(#[from] SaveError),

    /// The tree rejected the change
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Connection parameters could not be resolved
    #[error(transparent)]
    Resolve(#[from] ConfigError),

    /// Application settings could not be loaded
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Invalid input
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Group path not found
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// Computer path or ID not found
    #[error("Computer not found: {0}")]
    ComputerNotFound(String),

    /// A path matches several computers
    #[error("Ambiguous computer '{name}'. Matches: {}", .matches.join(", "))]
    Ambiguous {
        /// Requested path
        name: String,
        /// IDs of the candidates
        matches: Vec<String>,
    },

    /// The target file exists and `--force` was not given
    #[error("File already exists: {0} (use --force to overwrite)")]
    AlreadyExists(String),

    /// The two password entries differ
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// The user declined a confirmation
    #[error("Operation cancelled")]
    Cancelled,

    /// Reading interactive input failed
    #[error("Failed to read {what}: {source}")]
    Input {
        /// What was being read
        what: &'static str,
        /// Underlying error
        source: std::io::Error,
    },

    /// Output could not be produced
    #[error("Output error: {0}")]
    Output(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error
    /// - 2: Authentication failure (wrong or missing password, tampered file)
    /// - 3: Unknown or corrupted file format
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Open(e) if e.is_authentication() => exit_codes::AUTHENTICATION_FAILURE,
            Self::Open(
                OpenError::UnsupportedOrCorrupted(_) | OpenError::UnsupportedEncryption(_),
            ) => exit_codes::FORMAT_ERROR,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            CliError::Open(OpenError::WrongPasswordOrTampered).exit_code(),
            exit_codes::AUTHENTICATION_FAILURE
        );
        assert_eq!(
            CliError::Open(OpenError::PasswordRequired).exit_code(),
            exit_codes::AUTHENTICATION_FAILURE
        );
        assert_eq!(
            CliError::Open(OpenError::UnsupportedEncryption(7)).exit_code(),
            exit_codes::FORMAT_ERROR
        );
        assert_eq!(
            CliError::GroupNotFound("Office".to_string()).exit_code(),
            exit_codes::GENERAL_ERROR
        );
        assert_eq!(CliError::Cancelled.exit_code(), exit_codes::GENERAL_ERROR);
    }

    #[test]
    fn test_ambiguous_message() {
        let err = CliError::Ambiguous {
            name: "Office/PC".to_string(),
            matches: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "Ambiguous computer 'Office/PC'. Matches: a, b");
    }
}

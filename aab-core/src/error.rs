//! Error types for the address book store
//!
//! Every layer has its own `thiserror` enum. [`Error`] aggregates them for
//! callers that only need a single type (the CLI, for instance).
//!
//! A wrong password and a tampered file produce the same authentication
//! variant at every layer.

use std::path::PathBuf;

use thiserror::Error;

use crate::codec::CodecError;
use crate::config::SettingsError;
use crate::crypto::{DecryptError, EnvelopeError};
use crate::models::{ComputerId, GroupId, ItemId};
use crate::resolver::ConfigError;
use crate::store::ManagerError;

/// Top-level error type for address book operations
#[derive(Debug, Error)]
pub enum Error {
    /// Opening an address book failed
    #[error(transparent)]
    Open(#[from] OpenError),

    /// Saving an address book failed
    #[error(transparent)]
    Save(#[from] SaveError),

    /// A tree mutation was rejected
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A connection descriptor could not be resolved
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Application settings could not be loaded or saved
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Input failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The open-book registry rejected an operation
    #[error(transparent)]
    Manager(#[from] ManagerError),
}

/// Result type for top-level operations
pub type Result<T> = std::result::Result<T, Error>;

/// Input validation failures
///
/// Reported inline; the operation that produced them is not applied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is empty
    #[error("Name can not be empty")]
    EmptyName,

    /// Name exceeds the maximum length
    #[error("Too long name. The maximum length of the name is {max} characters")]
    NameTooLong {
        /// Maximum allowed length in characters
        max: usize,
    },

    /// Comment exceeds the maximum length
    #[error("Too long comment. The maximum length of the comment is {max} characters")]
    CommentTooLong {
        /// Maximum allowed length in characters
        max: usize,
    },

    /// User name contains characters outside `[A-Za-z0-9_.-]` or is too long
    #[error("The user name can contain only alphabet characters, numbers and _, -, . characters")]
    InvalidUserName,

    /// Password is empty or exceeds the envelope limit
    #[error("Password can not be empty and should not exceed {max} bytes")]
    InvalidPassword {
        /// Maximum allowed length in bytes
        max: usize,
    },

    /// Encryption was requested but no password supplied
    #[error("A password is required for encrypted address books")]
    PasswordRequired,

    /// Address could not be parsed
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Key derivation parameters are out of bounds
    #[error("Invalid key derivation parameters: {0}")]
    InvalidKdfParams(String),
}

/// Tree mutation failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Group or computer does not exist
    #[error("Not found: {0}")]
    NotFound(ItemId),

    /// The root group can not be deleted
    #[error("The root group can not be deleted")]
    CannotDeleteRoot,

    /// The root group can not be moved
    #[error("The root group can not be moved")]
    CannotMoveRoot,

    /// Moving a group into itself or one of its descendants
    #[error("Moving group {group} under {new_parent} would create a cycle")]
    CycleDetected {
        /// Group being moved
        group: GroupId,
        /// Requested new parent
        new_parent: GroupId,
    },

    /// Computer id already present in the book
    #[error("Computer with ID {0} already exists")]
    DuplicateId(ComputerId),

    /// Input failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl StoreError {
    pub(crate) const fn group_not_found(id: GroupId) -> Self {
        Self::NotFound(ItemId::Group(id))
    }

    pub(crate) const fn computer_not_found(id: ComputerId) -> Self {
        Self::NotFound(ItemId::Computer(id))
    }
}

/// Result type for tree mutations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures while opening an address book file
#[derive(Debug, Error)]
pub enum OpenError {
    /// File could not be read
    #[error("Unable to read address book file \"{}\": {source}", .path.display())]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Wrong password or the encrypted region was modified
    #[error("Unable to decrypt the address book with the specified password")]
    WrongPasswordOrTampered,

    /// The book is encrypted and no password was supplied
    #[error("Address book is encrypted. To open, you must enter a password")]
    PasswordRequired,

    /// The encryption tag in the header is not known
    #[error("The address book file is encrypted with an unsupported encryption type ({0})")]
    UnsupportedEncryption(u8),

    /// Unknown container or payload format, or structural corruption
    #[error("The address book file is corrupted or has an unknown format: {0}")]
    UnsupportedOrCorrupted(String),
}

impl OpenError {
    /// Returns true if the caller should offer to re-enter the password
    #[must_use]
    pub const fn is_authentication(&self) -> bool {
        matches!(self, Self::WrongPasswordOrTampered | Self::PasswordRequired)
    }
}

impl From<DecryptError> for OpenError {
    fn from(err: DecryptError) -> Self {
        match err {
            DecryptError::AuthenticationFailed => Self::WrongPasswordOrTampered,
            DecryptError::PasswordRequired => Self::PasswordRequired,
            DecryptError::Malformed(reason) => Self::UnsupportedOrCorrupted(reason),
        }
    }
}

impl From<CodecError> for OpenError {
    fn from(err: CodecError) -> Self {
        Self::UnsupportedOrCorrupted(err.to_string())
    }
}

/// Result type for open operations
pub type OpenResult<T> = std::result::Result<T, OpenError>;

/// Failures while saving an address book file
#[derive(Debug, Error)]
pub enum SaveError {
    /// The book was never saved and no path was given
    #[error("The address book has no file path")]
    NoPath,

    /// The book is encrypted but holds no password
    #[error("A password is required to save an encrypted address book")]
    PasswordRequired,

    /// Payload could not be encoded
    #[error("Failed to encode address book: {0}")]
    Encode(#[from] CodecError),

    /// Payload could not be sealed
    #[error("Failed to encrypt address book: {0}")]
    Encrypt(#[from] EnvelopeError),

    /// File could not be written or replaced
    #[error("Unable to write address book file \"{}\": {source}", .path.display())]
    Io {
        /// Target file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Result type for save operations
pub type SaveResult<T> = std::result::Result<T, SaveError>;

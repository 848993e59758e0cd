//! Address book store
//!
//! An [`AddressBook`] owns one [`Tree`] together with its properties and the
//! settings needed to write it back: file path, encryption mode, password
//! and key derivation parameters.
//!
//! # File layout
//!
//! ```text
//! [container header 6][sealed payload]
//! ```
//!
//! The container header ([`container`]) names the encryption mode, the
//! envelope ([`crate::crypto`]) seals the payload and the codec
//! ([`crate::codec`]) turns the payload into a tree.
//!
//! # Example
//!
//! ```rust,ignore
//! use aab_core::store::AddressBook;
//! use aab_core::models::{BookProperties, Computer};
//!
//! let mut book = AddressBook::new(BookProperties::new("Work"))?;
//! let office = book.add_group(book.tree().root_id(), "Office", "")?;
//! book.add_computer(office, Computer::new("PC1", "192.168.1.5"))?;
//! book.save_to(Path::new("work.aab"))?;
//! ```

pub mod container;
mod manager;
mod storage;
mod tree;

use std::path::{Path, PathBuf};

use ring::rand::SystemRandom;
use secrecy::{ExposeSecret, SecretString};

use crate::codec;
use crate::crypto::{self, EncryptionMode, KdfParams};
use crate::error::{
    OpenError, OpenResult, SaveError, SaveResult, StoreResult, ValidationError,
};
use crate::models::{BookProperties, Computer, ComputerId, GroupId};
use crate::tracing::span_names;
use crate::validation::{
    validate_comment, validate_encryption_password, validate_name, validate_username,
};
use crate::{trace_operation, trace_operation_debug};

pub use container::ContainerHeader;
pub use manager::{BookId, BookManager, ManagerError, ManagerResult};
pub use storage::{BookStorage, FsStorage, atomic_write};
pub use tree::{COPY_SUFFIX, SubtreeStats, Tree, TreeNode, WalkEntry};

/// File extension of address book files
pub const FILE_EXTENSION: &str = "aab";

/// An address book held in memory
#[derive(Debug)]
pub struct AddressBook {
    path: Option<PathBuf>,
    encryption: EncryptionMode,
    password: Option<SecretString>,
    kdf: KdfParams,
    properties: BookProperties,
    tree: Tree,
    dirty: bool,
}

impl AddressBook {
    /// Creates a new unsaved, unencrypted book holding only the root group
    ///
    /// New books count as having unsaved changes.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a bad name, comment or router user name.
    pub fn new(properties: BookProperties) -> StoreResult<Self> {
        validate_properties(&properties)?;
        Ok(Self {
            path: None,
            encryption: EncryptionMode::None,
            password: None,
            kdf: KdfParams::default(),
            properties,
            tree: Tree::new(),
            dirty: true,
        })
    }

    // ========== Load ==========

    /// Opens a book from the file system
    ///
    /// # Errors
    ///
    /// See [`Self::open_with`].
    pub fn open(path: &Path, password: Option<&SecretString>) -> OpenResult<Self> {
        Self::open_with(&FsStorage, path, password)
    }

    /// Opens a book through `storage`
    ///
    /// `password` is ignored for unencrypted books.
    ///
    /// # Errors
    ///
    /// - `Io` if the file cannot be read
    /// - `UnsupportedOrCorrupted` for an unknown container or payload
    ///   format or a structurally invalid payload
    /// - `UnsupportedEncryption` for an unknown encryption tag
    /// - `PasswordRequired` for an encrypted book opened without a password
    /// - `WrongPasswordOrTampered` if authentication fails
    pub fn open_with(
        storage: &dyn BookStorage,
        path: &Path,
        password: Option<&SecretString>,
    ) -> OpenResult<Self> {
        let _span = trace_operation!(span_names::BOOK_OPEN, path = %path.display()).entered();

        let data = storage.read(path).map_err(|source| OpenError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let (header, sealed) = ContainerHeader::parse(&data)?;
        let aad = header.to_bytes();
        let payload = crypto::open(
            sealed,
            password.map(|p| p.expose_secret()),
            header.encryption,
            &aad,
        )
        .inspect_err(|e| tracing::debug!(error = %e, "Failed to open sealed payload"))?;

        let (properties, tree) = codec::decode(&payload)?;

        let (kdf, password) = if header.encryption.is_encrypted() {
            (stored_kdf_params(sealed), password.cloned())
        } else {
            (KdfParams::default(), None)
        };

        tracing::info!(
            encryption = header.encryption.as_str(),
            groups = tree.group_count(),
            computers = tree.computer_count(),
            "Address book opened"
        );

        Ok(Self {
            path: Some(path.to_path_buf()),
            encryption: header.encryption,
            password,
            kdf,
            properties,
            tree,
            dirty: false,
        })
    }

    /// Reads only the container header and returns the encryption mode
    ///
    /// # Errors
    ///
    /// Returns `Io`, `UnsupportedOrCorrupted` or `UnsupportedEncryption`.
    pub fn peek_encryption(path: &Path) -> OpenResult<EncryptionMode> {
        Self::peek_encryption_with(&FsStorage, path)
    }

    /// Reads only the container header through `storage`
    ///
    /// # Errors
    ///
    /// Returns `Io`, `UnsupportedOrCorrupted` or `UnsupportedEncryption`.
    pub fn peek_encryption_with(
        storage: &dyn BookStorage,
        path: &Path,
    ) -> OpenResult<EncryptionMode> {
        let data = storage
            .read_prefix(path, container::HEADER_LEN)
            .map_err(|source| OpenError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let (header, _) = ContainerHeader::parse(&data)?;
        Ok(header.encryption)
    }

    /// Opens a book on the blocking thread pool
    ///
    /// Key derivation takes hundreds of milliseconds with default
    /// parameters; use this from async contexts.
    ///
    /// # Errors
    ///
    /// See [`Self::open_with`]; a panicked worker is reported as `Io`.
    pub async fn open_async(path: PathBuf, password: Option<SecretString>) -> OpenResult<Self> {
        let error_path = path.clone();
        tokio::task::spawn_blocking(move || Self::open(&path, password.as_ref()))
            .await
            .map_err(|e| OpenError::Io {
                path: error_path,
                source: std::io::Error::other(e),
            })?
    }

    // ========== Save ==========

    /// Saves to the path the book was opened from or last saved to
    ///
    /// # Errors
    ///
    /// Returns `NoPath` for a book that was never saved; see
    /// [`Self::save_to_with`] for the rest.
    pub fn save(&mut self) -> SaveResult<()> {
        self.save_with(&FsStorage)
    }

    /// Saves through `storage` to the current path
    ///
    /// # Errors
    ///
    /// Returns `NoPath` for a book that was never saved; see
    /// [`Self::save_to_with`] for the rest.
    pub fn save_with(&mut self, storage: &dyn BookStorage) -> SaveResult<()> {
        let path = self.path.clone().ok_or(SaveError::NoPath)?;
        self.save_to_with(storage, &path)
    }

    /// Saves to `path` and makes it the book's path
    ///
    /// # Errors
    ///
    /// See [`Self::save_to_with`].
    pub fn save_to(&mut self, path: &Path) -> SaveResult<()> {
        self.save_to_with(&FsStorage, path)
    }

    /// Encodes, seals and atomically writes the book to `path`
    ///
    /// The dirty flag is cleared and the path recorded only after the write
    /// has replaced the file.
    ///
    /// # Errors
    ///
    /// - `PasswordRequired` for an encrypted book without a password
    /// - `Encode` or `Encrypt` if the payload cannot be produced
    /// - `Io` if the file cannot be written; the previous file is intact
    pub fn save_to_with(&mut self, storage: &dyn BookStorage, path: &Path) -> SaveResult<()> {
        let _span = trace_operation!(
            span_names::BOOK_SAVE,
            path = %path.display(),
            encryption = self.encryption.as_str()
        )
        .entered();

        let bytes = self.to_file_bytes()?;
        storage
            .write_atomic(path, &bytes)
            .map_err(|source| SaveError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        self.path = Some(path.to_path_buf());
        self.dirty = false;
        tracing::info!(size = bytes.len(), "Address book saved");
        Ok(())
    }

    /// Saves on the blocking thread pool
    ///
    /// Sealing and writing run on a snapshot of the book.
    ///
    /// # Errors
    ///
    /// See [`Self::save_to_with`]; a panicked worker is reported as `Io`.
    pub async fn save_async(&mut self) -> SaveResult<()> {
        let path = self.path.clone().ok_or(SaveError::NoPath)?;
        let snapshot = Snapshot {
            encryption: self.encryption,
            password: self.password.clone(),
            kdf: self.kdf,
            properties: self.properties.clone(),
            tree: self.tree.clone(),
        };
        let target = path.clone();

        tokio::task::spawn_blocking(move || {
            let bytes = snapshot.to_file_bytes()?;
            atomic_write(&target, &bytes).map_err(|source| SaveError::Io {
                path: target.clone(),
                source,
            })
        })
        .await
        .map_err(|e| SaveError::Io {
            path,
            source: std::io::Error::other(e),
        })??;

        self.dirty = false;
        Ok(())
    }

    /// Produces the complete file contents
    fn to_file_bytes(&self) -> SaveResult<Vec<u8>> {
        file_bytes(
            self.encryption,
            self.password.as_ref(),
            &self.kdf,
            &self.properties,
            &self.tree,
        )
    }

    // ========== Book settings ==========

    /// File path, if the book has been opened or saved
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Encryption mode used by the next save
    #[must_use]
    pub const fn encryption(&self) -> EncryptionMode {
        self.encryption
    }

    /// Returns true if a password is held for the next save
    #[must_use]
    pub const fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Key derivation parameters used by the next save
    #[must_use]
    pub const fn kdf_params(&self) -> KdfParams {
        self.kdf
    }

    /// Changes encryption mode and password for the next save
    ///
    /// The password is dropped when switching to [`EncryptionMode::None`].
    ///
    /// # Errors
    ///
    /// Returns `PasswordRequired` if encryption is requested without a
    /// password and `InvalidPassword` if it is empty or too long.
    pub fn set_encryption(
        &mut self,
        mode: EncryptionMode,
        password: Option<SecretString>,
    ) -> Result<(), ValidationError> {
        let password = match mode {
            EncryptionMode::None => None,
            EncryptionMode::ChaCha20Poly1305 => {
                let password = password.ok_or(ValidationError::PasswordRequired)?;
                validate_encryption_password(password.expose_secret())?;
                Some(password)
            }
        };

        self.encryption = mode;
        self.password = password;
        self.dirty = true;
        tracing::debug!(encryption = mode.as_str(), "Encryption changed");
        Ok(())
    }

    /// Changes the key derivation parameters for the next save
    ///
    /// # Errors
    ///
    /// Returns `InvalidKdfParams` if the parameters are out of bounds.
    pub fn set_kdf_params(&mut self, params: KdfParams) -> Result<(), ValidationError> {
        params.validate().map_err(ValidationError::InvalidKdfParams)?;
        if params != self.kdf {
            self.kdf = params;
            if self.encryption.is_encrypted() {
                self.dirty = true;
            }
        }
        Ok(())
    }

    /// Book properties
    #[must_use]
    pub const fn properties(&self) -> &BookProperties {
        &self.properties
    }

    /// Replaces the book properties
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a bad name, comment or router user name.
    pub fn set_properties(&mut self, properties: BookProperties) -> StoreResult<()> {
        validate_properties(&properties)?;
        self.properties = properties;
        self.dirty = true;
        Ok(())
    }

    // ========== Tree ==========

    /// The group/computer hierarchy
    #[must_use]
    pub const fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Returns true if there are changes since the last open or save
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Applies a tree mutation and marks the book dirty on success
    fn mutate<T>(
        &mut self,
        operation: &'static str,
        apply: impl FnOnce(&mut Tree) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let _span = trace_operation_debug!(span_names::STORE_MUTATE, operation).entered();
        let result = apply(&mut self.tree);
        match &result {
            Ok(_) => self.dirty = true,
            Err(e) => tracing::debug!(error = %e, "Mutation rejected"),
        }
        result
    }

    /// See [`Tree::add_group`]
    ///
    /// # Errors
    ///
    /// Returns `Validation` or `NotFound`.
    pub fn add_group(
        &mut self,
        parent: GroupId,
        name: &str,
        comment: &str,
    ) -> StoreResult<GroupId> {
        self.mutate("add_group", |tree| tree.add_group(parent, name, comment))
    }

    /// See [`Tree::update_group`]
    ///
    /// # Errors
    ///
    /// Returns `Validation` or `NotFound`.
    pub fn update_group(&mut self, id: GroupId, name: &str, comment: &str) -> StoreResult<()> {
        self.mutate("update_group", |tree| tree.update_group(id, name, comment))
    }

    /// See [`Tree::set_group_expanded`]
    ///
    /// # Errors
    ///
    /// Returns `NotFound`.
    pub fn set_group_expanded(&mut self, id: GroupId, expanded: bool) -> StoreResult<()> {
        self.mutate("set_group_expanded", |tree| tree.set_group_expanded(id, expanded))
    }

    /// See [`Tree::delete_group`]
    ///
    /// # Errors
    ///
    /// Returns `CannotDeleteRoot` or `NotFound`.
    pub fn delete_group(&mut self, id: GroupId) -> StoreResult<SubtreeStats> {
        self.mutate("delete_group", |tree| tree.delete_group(id))
    }

    /// See [`Tree::move_group`]
    ///
    /// # Errors
    ///
    /// Returns `CannotMoveRoot`, `CycleDetected` or `NotFound`.
    pub fn move_group(&mut self, id: GroupId, new_parent: GroupId) -> StoreResult<()> {
        self.mutate("move_group", |tree| tree.move_group(id, new_parent))
    }

    /// See [`Tree::reorder_group`]
    ///
    /// # Errors
    ///
    /// Returns `CannotMoveRoot` or `NotFound`.
    pub fn reorder_group(&mut self, id: GroupId, index: usize) -> StoreResult<()> {
        self.mutate("reorder_group", |tree| tree.reorder_group(id, index))
    }

    /// See [`Tree::add_computer`]
    ///
    /// # Errors
    ///
    /// Returns `Validation`, `DuplicateId` or `NotFound`.
    pub fn add_computer(&mut self, parent: GroupId, computer: Computer) -> StoreResult<ComputerId> {
        self.mutate("add_computer", |tree| tree.add_computer(parent, computer))
    }

    /// See [`Tree::update_computer`]
    ///
    /// # Errors
    ///
    /// Returns `Validation` or `NotFound`.
    pub fn update_computer(&mut self, id: ComputerId, computer: Computer) -> StoreResult<()> {
        self.mutate("update_computer", |tree| tree.update_computer(id, computer))
    }

    /// See [`Tree::delete_computer`]
    ///
    /// # Errors
    ///
    /// Returns `NotFound`.
    pub fn delete_computer(&mut self, id: ComputerId) -> StoreResult<Computer> {
        self.mutate("delete_computer", |tree| tree.delete_computer(id))
    }

    /// See [`Tree::move_computer`]
    ///
    /// # Errors
    ///
    /// Returns `NotFound`.
    pub fn move_computer(&mut self, id: ComputerId, new_parent: GroupId) -> StoreResult<()> {
        self.mutate("move_computer", |tree| tree.move_computer(id, new_parent))
    }

    /// See [`Tree::reorder_computer`]
    ///
    /// # Errors
    ///
    /// Returns `NotFound`.
    pub fn reorder_computer(&mut self, id: ComputerId, index: usize) -> StoreResult<()> {
        self.mutate("reorder_computer", |tree| tree.reorder_computer(id, index))
    }

    /// See [`Tree::copy_computer`]
    ///
    /// # Errors
    ///
    /// Returns `NotFound`.
    pub fn copy_computer(&mut self, id: ComputerId) -> StoreResult<ComputerId> {
        self.mutate("copy_computer", |tree| tree.copy_computer(id))
    }
}

/// Owned copy of everything needed to write a book
struct Snapshot {
    encryption: EncryptionMode,
    password: Option<SecretString>,
    kdf: KdfParams,
    properties: BookProperties,
    tree: Tree,
}

impl Snapshot {
    fn to_file_bytes(&self) -> SaveResult<Vec<u8>> {
        file_bytes(
            self.encryption,
            self.password.as_ref(),
            &self.kdf,
            &self.properties,
            &self.tree,
        )
    }
}

fn validate_properties(properties: &BookProperties) -> StoreResult<()> {
    validate_name(&properties.name)?;
    validate_comment(&properties.comment)?;
    if let Some(router) = &properties.router {
        validate_username(&router.username)?;
    }
    Ok(())
}

/// Encodes and seals a book into complete file contents
fn file_bytes(
    encryption: EncryptionMode,
    password: Option<&SecretString>,
    kdf: &KdfParams,
    properties: &BookProperties,
    tree: &Tree,
) -> SaveResult<Vec<u8>> {
    let password = match (encryption, password) {
        (EncryptionMode::None, _) => None,
        (EncryptionMode::ChaCha20Poly1305, Some(password)) => Some(password.expose_secret()),
        (EncryptionMode::ChaCha20Poly1305, None) => return Err(SaveError::PasswordRequired),
    };

    let header = ContainerHeader::new(encryption).to_bytes();
    let payload = codec::encode(properties, tree)?;
    let sealed = crypto::seal(&payload, password, encryption, &header, kdf, &SystemRandom::new())?;

    let mut bytes = Vec::with_capacity(header.len() + sealed.len());
    bytes.extend_from_slice(&header);
    bytes.extend_from_slice(&sealed);
    Ok(bytes)
}

/// Reads the KDF parameters stored at the start of a sealed payload
fn stored_kdf_params(sealed: &[u8]) -> KdfParams {
    sealed
        .get(..KdfParams::ENCODED_LEN)
        .and_then(|bytes| <&[u8; KdfParams::ENCODED_LEN]>::try_from(bytes).ok())
        .map_or_else(KdfParams::default, KdfParams::from_bytes)
}

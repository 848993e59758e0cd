//! Address book core library
//!
//! This crate provides the core of the `aab` address book: a tree of
//! computer groups and remote-desktop connection descriptors persisted as a
//! single, optionally password-encrypted `.aab` file.
//!
//! # Crate Structure
//!
//! - [`models`] - Core data structures (Group, Computer, connection descriptors)
//! - [`store`] - Group tree, address book documents, the open-book registry
//! - [`codec`] - Deterministic binary serialization of a book
//! - [`crypto`] - Argon2id key derivation and the ChaCha20-Poly1305 envelope
//! - [`resolver`] - Effective connection parameters from computer and book defaults
//! - [`validation`] - Name, user name, password and host address rules
//! - [`config`] - Application settings and persistence
//! - [`confirm`] - Confirmation prompts for destructive operations
//! - [`tracing`] - Structured logging setup

#![warn(missing_docs)]

pub mod codec;
pub mod config;
pub mod confirm;
pub mod crypto;
pub mod error;
pub mod models;
pub mod resolver;
pub mod store;
pub mod tracing;
pub mod validation;

pub use config::{AppSettings, ConfigManager, SettingsError, SettingsResult};
pub use confirm::{AlwaysConfirm, Confirmation, NeverConfirm, Prompt};
pub use crypto::{EncryptionMode, KdfParams};
pub use error::{
    Error, OpenError, OpenResult, Result, SaveError, SaveResult, StoreError, StoreResult,
    ValidationError,
};
pub use models::{
    BookProperties, Computer, ComputerId, ConnectionDescriptor, DesktopConfig, Group, GroupId,
    ItemId, RouterConfig, SessionType,
};
pub use resolver::{ConfigError, ResolvedConnection, resolve};
pub use store::{AddressBook, BookId, BookManager, ManagerError, SubtreeStats, Tree};

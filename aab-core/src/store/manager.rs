//! Registry of open address books.
//!
//! Each open book gets a [`BookId`] for the lifetime of the process. The
//! same file can only be open once; paths are compared after
//! canonicalization.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use thiserror::Error;
use uuid::Uuid;

use super::{AddressBook, BookStorage, FsStorage};
use crate::confirm::{Confirmation, Prompt};
use crate::error::{OpenError, SaveError, StoreError};
use crate::models::BookProperties;

/// Process-scoped identifier of an open book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(Uuid);

impl BookId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Errors that can occur in the book registry
#[derive(Debug, Error)]
pub enum ManagerError {
    /// The file is already open under another id
    #[error("Address Book \"{name}\" is already open")]
    AlreadyOpen {
        /// Name of the open book
        name: String,
        /// Id of the open book
        id: BookId,
    },

    /// No book with this id is open
    #[error("Address book not found: {0}")]
    NotFound(BookId),

    /// Opening failed
    #[error(transparent)]
    Open(#[from] OpenError),

    /// Saving failed
    #[error(transparent)]
    Save(#[from] SaveError),

    /// The book properties were rejected
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for registry operations
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Registry of open address books
pub struct BookManager {
    books: HashMap<BookId, AddressBook>,
    /// Canonical file paths of books that have one
    canonical_paths: HashMap<BookId, PathBuf>,
    /// Ids in the order books were opened or created
    order: Vec<BookId>,
    storage: Box<dyn BookStorage>,
}

impl fmt::Debug for BookManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookManager")
            .field("books", &self.order)
            .finish_non_exhaustive()
    }
}

impl Default for BookManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BookManager {
    /// Creates an empty registry backed by the local file system
    #[must_use]
    pub fn new() -> Self {
        Self::with_storage(Box::new(FsStorage))
    }

    /// Creates an empty registry backed by `storage`
    #[must_use]
    pub fn with_storage(storage: Box<dyn BookStorage>) -> Self {
        Self {
            books: HashMap::new(),
            canonical_paths: HashMap::new(),
            order: Vec::new(),
            storage,
        }
    }

    /// Creates a new unsaved book
    ///
    /// # Errors
    ///
    /// Returns `Store` if the properties fail validation.
    pub fn create(&mut self, properties: BookProperties) -> ManagerResult<BookId> {
        Ok(self.insert(AddressBook::new(properties)?))
    }

    /// Opens a book unless the same file is already open
    ///
    /// # Errors
    ///
    /// Returns `AlreadyOpen` if the file is open under another id, or the
    /// `Open` error from [`AddressBook::open_with`].
    pub fn open(&mut self, path: &Path, password: Option<&SecretString>) -> ManagerResult<BookId> {
        let canonical = canonicalize(path);
        if let Some(id) = self.find_by_path(&canonical) {
            let name = self
                .books
                .get(&id)
                .map(|book| book.properties().name.clone())
                .unwrap_or_default();
            return Err(ManagerError::AlreadyOpen { name, id });
        }

        let book = AddressBook::open_with(self.storage.as_ref(), path, password)?;
        let id = self.insert(book);
        self.canonical_paths.insert(id, canonical);
        Ok(id)
    }

    /// Adds an already loaded book
    pub fn insert(&mut self, book: AddressBook) -> BookId {
        let id = BookId::new();
        if let Some(path) = book.path() {
            self.canonical_paths.insert(id, canonicalize(path));
        }
        self.books.insert(id, book);
        self.order.push(id);
        id
    }

    /// Gets a book by id
    #[must_use]
    pub fn get(&self, id: BookId) -> Option<&AddressBook> {
        self.books.get(&id)
    }

    /// Gets a mutable book by id
    pub fn get_mut(&mut self, id: BookId) -> Option<&mut AddressBook> {
        self.books.get_mut(&id)
    }

    /// Saves a book to its current path
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or the `Save` error.
    pub fn save(&mut self, id: BookId) -> ManagerResult<()> {
        let book = self.books.get_mut(&id).ok_or(ManagerError::NotFound(id))?;
        book.save_with(self.storage.as_ref())?;
        Ok(())
    }

    /// Saves a book to a new path
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `AlreadyOpen` if another open book uses `path`,
    /// or the `Save` error.
    pub fn save_as(&mut self, id: BookId, path: &Path) -> ManagerResult<()> {
        if !self.books.contains_key(&id) {
            return Err(ManagerError::NotFound(id));
        }
        let canonical = canonicalize(path);
        if let Some(other) = self.find_by_path(&canonical).filter(|other| *other != id) {
            let name = self
                .books
                .get(&other)
                .map(|book| book.properties().name.clone())
                .unwrap_or_default();
            return Err(ManagerError::AlreadyOpen { name, id: other });
        }

        let book = self.books.get_mut(&id).ok_or(ManagerError::NotFound(id))?;
        book.save_to_with(self.storage.as_ref(), path)?;
        self.canonical_paths.insert(id, canonicalize(path));
        Ok(())
    }

    /// Saves every book with unsaved changes
    ///
    /// Returns the books that failed; the others are saved even if one
    /// fails. Books without a path fail with `NoPath`.
    pub fn save_all(&mut self) -> Vec<(BookId, SaveError)> {
        let mut failures = Vec::new();
        for id in self.dirty_ids() {
            if let Some(book) = self.books.get_mut(&id)
                && let Err(e) = book.save_with(self.storage.as_ref())
            {
                tracing::warn!(book = %id, error = %e, "Failed to save address book");
                failures.push((id, e));
            }
        }
        failures
    }

    /// Closes a book, asking before discarding unsaved changes
    ///
    /// Returns false if the user declined and the book stays open.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no book with this id is open.
    pub fn close(&mut self, id: BookId, confirm: &dyn Confirmation) -> ManagerResult<bool> {
        let book = self.books.get(&id).ok_or(ManagerError::NotFound(id))?;
        if book.is_dirty() {
            let prompt = Prompt::DiscardChanges {
                book: &book.properties().name,
            };
            if !confirm.confirm(&prompt) {
                return Ok(false);
            }
        }
        self.remove(id);
        Ok(true)
    }

    /// Closes every book, asking for each dirty one
    ///
    /// Returns the ids of books that stay open.
    pub fn close_all(&mut self, confirm: &dyn Confirmation) -> Vec<BookId> {
        self.book_ids()
            .into_iter()
            .filter(|id| !matches!(self.close(*id, confirm), Ok(true)))
            .collect()
    }

    fn remove(&mut self, id: BookId) -> Option<AddressBook> {
        self.canonical_paths.remove(&id);
        self.order.retain(|other| *other != id);
        self.books.remove(&id)
    }

    fn find_by_path(&self, canonical: &Path) -> Option<BookId> {
        self.canonical_paths
            .iter()
            .find(|(_, path)| path.as_path() == canonical)
            .map(|(id, _)| *id)
    }

    /// Ids of all open books in the order they were opened
    #[must_use]
    pub fn book_ids(&self) -> Vec<BookId> {
        self.order.clone()
    }

    /// Ids of books with unsaved changes
    #[must_use]
    pub fn dirty_ids(&self) -> Vec<BookId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.books.get(id).is_some_and(AddressBook::is_dirty))
            .collect()
    }

    /// Returns true if any book has unsaved changes
    #[must_use]
    pub fn has_dirty_books(&self) -> bool {
        self.books.values().any(AddressBook::is_dirty)
    }

    /// Number of open books
    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Returns true if no book is open
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

/// Resolves symlinks and relative components; falls back to the path as
/// given when it does not exist yet
fn canonicalize(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::{AlwaysConfirm, NeverConfirm};
    use tempfile::TempDir;

    fn saved_book(dir: &TempDir, file: &str) -> PathBuf {
        let path = dir.path().join(file);
        let mut book = AddressBook::new(BookProperties::new(file)).unwrap();
        book.save_to(&path).unwrap();
        path
    }

    #[test]
    fn test_create_is_dirty() {
        let mut manager = BookManager::new();
        let id = manager.create(BookProperties::new("New")).unwrap();
        assert!(manager.has_dirty_books());
        assert_eq!(manager.dirty_ids(), vec![id]);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_create_rejects_empty_name() {
        let mut manager = BookManager::new();
        assert!(matches!(
            manager.create(BookProperties::new("")),
            Err(ManagerError::Store(StoreError::Validation(_)))
        ));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_open_same_file_twice_rejected() {
        let dir = TempDir::new().unwrap();
        let path = saved_book(&dir, "a.aab");
        let mut manager = BookManager::new();

        let id = manager.open(&path, None).unwrap();
        let again = dir.path().join(".").join("a.aab");
        match manager.open(&again, None) {
            Err(ManagerError::AlreadyOpen { name, id: open_id }) => {
                assert_eq!(name, "a.aab");
                assert_eq!(open_id, id);
            }
            other => panic!("expected AlreadyOpen, got {other:?}"),
        }
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_close_asks_before_discarding() {
        let dir = TempDir::new().unwrap();
        let path = saved_book(&dir, "a.aab");
        let mut manager = BookManager::new();
        let id = manager.open(&path, None).unwrap();

        let root = manager.get(id).unwrap().tree().root_id();
        manager
            .get_mut(id)
            .unwrap()
            .add_group(root, "Office", "")
            .unwrap();

        assert!(!manager.close(id, &NeverConfirm).unwrap());
        assert_eq!(manager.len(), 1);
        assert!(manager.close(id, &AlwaysConfirm).unwrap());
        assert!(manager.is_empty());

        // Closed books can be reopened
        manager.open(&path, None).unwrap();
    }

    #[test]
    fn test_clean_book_closes_without_asking() {
        let dir = TempDir::new().unwrap();
        let path = saved_book(&dir, "a.aab");
        let mut manager = BookManager::new();
        let id = manager.open(&path, None).unwrap();
        assert!(manager.close(id, &NeverConfirm).unwrap());
    }

    #[test]
    fn test_save_all_reports_failures() {
        let dir = TempDir::new().unwrap();
        let path = saved_book(&dir, "a.aab");
        let mut manager = BookManager::new();
        let opened = manager.open(&path, None).unwrap();
        let unsaved = manager.create(BookProperties::new("Unsaved")).unwrap();

        let root = manager.get(opened).unwrap().tree().root_id();
        manager
            .get_mut(opened)
            .unwrap()
            .add_group(root, "Office", "")
            .unwrap();

        let failures = manager.save_all();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, unsaved);
        assert!(matches!(failures[0].1, SaveError::NoPath));
        assert_eq!(manager.dirty_ids(), vec![unsaved]);
    }

    #[test]
    fn test_close_all_keeps_declined() {
        let dir = TempDir::new().unwrap();
        let path = saved_book(&dir, "a.aab");
        let mut manager = BookManager::new();
        manager.open(&path, None).unwrap();
        let unsaved = manager.create(BookProperties::new("Unsaved")).unwrap();

        assert_eq!(manager.close_all(&NeverConfirm), vec![unsaved]);
        assert_eq!(manager.book_ids(), vec![unsaved]);
    }

    #[test]
    fn test_save_as_registers_path() {
        let dir = TempDir::new().unwrap();
        let mut manager = BookManager::new();
        let id = manager.create(BookProperties::new("New")).unwrap();
        let path = dir.path().join("new.aab");

        manager.save_as(id, &path).unwrap();
        assert!(!manager.has_dirty_books());
        assert!(matches!(
            manager.open(&path, None),
            Err(ManagerError::AlreadyOpen { .. })
        ));
    }

    #[test]
    fn test_unknown_id() {
        let mut manager = BookManager::new();
        let id = BookId::new();
        assert!(matches!(manager.save(id), Err(ManagerError::NotFound(_))));
        assert!(matches!(
            manager.close(id, &AlwaysConfirm),
            Err(ManagerError::NotFound(_))
        ));
    }
}

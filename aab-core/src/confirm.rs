//! Yes/no confirmation before destructive operations.
//!
//! Front ends implement [`Confirmation`] with a dialog or a terminal
//! prompt. The store never asks by itself; callers ask before deleting and
//! the [`BookManager`](crate::store::BookManager) asks before discarding
//! unsaved changes.

use std::fmt;

use crate::store::SubtreeStats;

/// What the user is asked to confirm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt<'a> {
    /// Deleting a single computer
    DeleteComputer {
        /// Computer name
        name: &'a str,
    },
    /// Deleting a group with everything below it
    DeleteGroup {
        /// Group name
        name: &'a str,
        /// What else goes with it
        stats: SubtreeStats,
    },
    /// Closing a book with unsaved changes
    DiscardChanges {
        /// Book name
        book: &'a str,
    },
}

impl fmt::Display for Prompt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteComputer { name } => {
                write!(f, "Are you sure you want to delete computer \"{name}\"?")
            }
            Self::DeleteGroup { name, stats } if stats.is_empty() => {
                write!(f, "Are you sure you want to delete computer group \"{name}\"?")
            }
            Self::DeleteGroup { name, stats } => write!(
                f,
                "Are you sure you want to delete computer group \"{name}\" and all child items \
                 ({} child group(s), {} computer(s))?",
                stats.groups, stats.computers
            ),
            Self::DiscardChanges { book } => write!(
                f,
                "Address book \"{book}\" has been changed. Discard changes?"
            ),
        }
    }
}

/// Asks the user to confirm a [`Prompt`]
pub trait Confirmation {
    /// Returns true if the user agreed
    fn confirm(&self, prompt: &Prompt<'_>) -> bool;
}

/// Agrees to everything (`--yes` on the command line)
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirmation for AlwaysConfirm {
    fn confirm(&self, _prompt: &Prompt<'_>) -> bool {
        true
    }
}

/// Refuses everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverConfirm;

impl Confirmation for NeverConfirm {
    fn confirm(&self, _prompt: &Prompt<'_>) -> bool {
        false
    }
}

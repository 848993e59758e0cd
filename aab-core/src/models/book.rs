//! Address book level properties.

use super::RouterConfig;

/// Book name used for newly created address books
pub const DEFAULT_BOOK_NAME: &str = "Address Book";

/// Properties of an address book as shown in its properties dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookProperties {
    /// Book name
    pub name: String,
    /// Free-form comment
    pub comment: String,
    /// Default router for computers reached by ID ("Use a router")
    pub router: Option<RouterConfig>,
}

impl BookProperties {
    /// Creates properties with the given name and no router
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: String::new(),
            router: None,
        }
    }

    /// Sets the comment
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Sets the default router
    #[must_use]
    pub fn with_router(mut self, router: RouterConfig) -> Self {
        self.router = Some(router);
        self
    }
}

impl Default for BookProperties {
    fn default() -> Self {
        Self::new(DEFAULT_BOOK_NAME)
    }
}

//! Group model for hierarchical organization.

use super::{ComputerId, GroupId};

/// Default display name of the root group
pub const ROOT_GROUP_NAME: &str = "Root Group";

/// A node in the address book tree
///
/// Children are held as ordered id lists; the order is the display order.
/// Groups are owned by the store's arena and only mutated through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Stable identifier
    pub id: GroupId,
    /// Display name (sibling duplicates allowed)
    pub name: String,
    /// Free-form comment
    pub comment: String,
    /// Parent group (None only for the root)
    pub parent: Option<GroupId>,
    /// Whether the group is expanded in tree views
    pub expanded: bool,
    pub(crate) groups: Vec<GroupId>,
    pub(crate) computers: Vec<ComputerId>,
}

impl Group {
    pub(crate) fn new(id: GroupId, parent: Option<GroupId>, name: String, comment: String) -> Self {
        Self {
            id,
            name,
            comment,
            parent,
            expanded: false,
            groups: Vec::new(),
            computers: Vec::new(),
        }
    }

    pub(crate) fn root() -> Self {
        let mut root = Self::new(GroupId::new(), None, ROOT_GROUP_NAME.to_string(), String::new());
        root.expanded = true;
        root
    }

    /// Returns true if this is the root group
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Direct child groups in display order
    #[must_use]
    pub fn child_group_ids(&self) -> &[GroupId] {
        &self.groups
    }

    /// Direct computers in display order
    #[must_use]
    pub fn computer_ids(&self) -> &[ComputerId] {
        &self.computers
    }
}

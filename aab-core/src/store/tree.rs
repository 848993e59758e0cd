//! Arena tree of groups and computers.
//!
//! Groups and computers live in maps keyed by id; each group keeps ordered
//! lists of child ids and each node knows its parent. All structural edits
//! go through this type so the invariants hold after every call:
//!
//! - exactly one root, reachable parent links from every node, no cycles
//! - every computer is listed by exactly one group (its `group` field)
//! - ids are unique across the book
//!
//! Every mutating method validates first and commits second; on error the
//! tree is unchanged.

use std::collections::HashMap;

use crate::error::{StoreError, StoreResult};
use crate::models::{Computer, ComputerId, Group, GroupId};
use crate::validation::{MAX_NAME_LENGTH, validate_comment, validate_name, validate_username};

/// Suffix appended to the name of a copied computer
pub const COPY_SUFFIX: &str = " (copy)";

/// Size of a group's subtree, used to confirm cascading deletes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubtreeStats {
    /// Descendant groups, not counting the group itself
    pub groups: usize,
    /// Computers in the group and all descendant groups
    pub computers: usize,
}

impl SubtreeStats {
    /// Returns true if the subtree holds no groups or computers
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.groups == 0 && self.computers == 0
    }
}

/// A node yielded by [`Tree::walk`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeNode<'a> {
    /// A group
    Group(&'a Group),
    /// A computer
    Computer(&'a Computer),
}

/// A node and its depth below the root (root has depth 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkEntry<'a> {
    /// Depth below the root
    pub depth: usize,
    /// The node
    pub node: TreeNode<'a>,
}

/// The group/computer hierarchy of one address book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    root: GroupId,
    groups: HashMap<GroupId, Group>,
    computers: HashMap<ComputerId, Computer>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Creates a tree holding only the root group
    #[must_use]
    pub fn new() -> Self {
        Self::from_root(Group::root())
    }

    pub(crate) fn from_root(root: Group) -> Self {
        let root_id = root.id;
        let mut groups = HashMap::new();
        groups.insert(root_id, root);
        Self {
            root: root_id,
            groups,
            computers: HashMap::new(),
        }
    }

    // ========== Queries ==========

    /// Returns the root group
    #[must_use]
    pub fn root(&self) -> &Group {
        &self.groups[&self.root]
    }

    /// Returns the id of the root group
    #[must_use]
    pub const fn root_id(&self) -> GroupId {
        self.root
    }

    /// Gets a group by id
    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    /// Gets a computer by id
    #[must_use]
    pub fn computer(&self, id: ComputerId) -> Option<&Computer> {
        self.computers.get(&id)
    }

    /// Direct child groups of `id` in display order
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the group does not exist.
    pub fn child_groups(&self, id: GroupId) -> StoreResult<Vec<&Group>> {
        let group = self.require_group(id)?;
        Ok(group
            .groups
            .iter()
            .filter_map(|child| self.groups.get(child))
            .collect())
    }

    /// Computers directly in `id` in display order
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the group does not exist.
    pub fn computers_in(&self, id: GroupId) -> StoreResult<Vec<&Computer>> {
        let group = self.require_group(id)?;
        Ok(group
            .computers
            .iter()
            .filter_map(|child| self.computers.get(child))
            .collect())
    }

    /// Counts descendant groups and contained computers of `id`
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the group does not exist.
    pub fn subtree_stats(&self, id: GroupId) -> StoreResult<SubtreeStats> {
        self.require_group(id)?;
        let subtree = self.collect_subtree(id);
        let computers = subtree
            .iter()
            .filter_map(|gid| self.groups.get(gid))
            .map(|g| g.computers.len())
            .sum();
        Ok(SubtreeStats {
            groups: subtree.len() - 1,
            computers,
        })
    }

    /// Gets the path of a group below the root (e.g., "Office/Servers")
    ///
    /// The root group's path is the empty string.
    #[must_use]
    pub fn group_path(&self, id: GroupId) -> Option<String> {
        let mut parts = Vec::new();
        let mut current = self.groups.get(&id)?;
        while let Some(parent) = current.parent {
            parts.push(current.name.as_str());
            current = self.groups.get(&parent)?;
        }
        parts.reverse();
        Some(parts.join("/"))
    }

    /// Finds a group by its slash-separated path below the root
    ///
    /// Sibling names may repeat; the first match in display order wins.
    /// An empty path (or "/") names the root.
    #[must_use]
    pub fn find_group_by_path(&self, path: &str) -> Option<GroupId> {
        let mut current = self.root;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = self
                .groups
                .get(&current)?
                .groups
                .iter()
                .copied()
                .find(|child| self.groups.get(child).is_some_and(|g| g.name == segment))?;
        }
        Some(current)
    }

    /// Full display path of a computer ("Office/Servers/PC1")
    #[must_use]
    pub fn computer_path(&self, id: ComputerId) -> Option<String> {
        let computer = self.computers.get(&id)?;
        let group_path = self.group_path(computer.group)?;
        if group_path.is_empty() {
            Some(computer.name.clone())
        } else {
            Some(format!("{group_path}/{}", computer.name))
        }
    }

    /// Walks the tree in pre-order
    ///
    /// Each group is followed by its child groups (recursively) and then by
    /// its computers, all in display order.
    #[must_use]
    pub fn walk(&self) -> Vec<WalkEntry<'_>> {
        enum Pending {
            Group(GroupId),
            Computer(ComputerId),
        }

        let mut out = Vec::with_capacity(self.groups.len() + self.computers.len());
        let mut stack = vec![(Pending::Group(self.root), 0usize)];

        while let Some((pending, depth)) = stack.pop() {
            match pending {
                Pending::Group(id) => {
                    let Some(group) = self.groups.get(&id) else {
                        continue;
                    };
                    out.push(WalkEntry {
                        depth,
                        node: TreeNode::Group(group),
                    });
                    stack.extend(
                        group
                            .computers
                            .iter()
                            .rev()
                            .map(|c| (Pending::Computer(*c), depth + 1)),
                    );
                    stack.extend(
                        group
                            .groups
                            .iter()
                            .rev()
                            .map(|g| (Pending::Group(*g), depth + 1)),
                    );
                }
                Pending::Computer(id) => {
                    if let Some(computer) = self.computers.get(&id) {
                        out.push(WalkEntry {
                            depth,
                            node: TreeNode::Computer(computer),
                        });
                    }
                }
            }
        }
        out
    }

    /// Group ids in pre-order, root first, children in display order
    #[must_use]
    pub fn group_ids_preorder(&self) -> Vec<GroupId> {
        self.collect_subtree(self.root)
    }

    /// Number of groups, including the root
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of computers
    #[must_use]
    pub fn computer_count(&self) -> usize {
        self.computers.len()
    }

    /// Iterates over all computers in unspecified order
    pub fn computers(&self) -> impl Iterator<Item = &Computer> {
        self.computers.values()
    }

    // ========== Group mutations ==========

    /// Adds a group at the end of `parent`'s child list
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a bad name or comment, `NotFound` if the
    /// parent does not exist.
    pub fn add_group(
        &mut self,
        parent: GroupId,
        name: &str,
        comment: &str,
    ) -> StoreResult<GroupId> {
        validate_name(name)?;
        validate_comment(comment)?;
        self.require_group(parent)?;

        let group = Group::new(GroupId::new(), Some(parent), name.to_string(), comment.to_string());
        let id = group.id;
        self.groups.insert(id, group);
        self.group_mut(parent)?.groups.push(id);
        Ok(id)
    }

    /// Renames a group and replaces its comment
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a bad name or comment, `NotFound` if the
    /// group does not exist.
    pub fn update_group(&mut self, id: GroupId, name: &str, comment: &str) -> StoreResult<()> {
        validate_name(name)?;
        validate_comment(comment)?;
        let group = self.group_mut(id)?;
        group.name = name.to_string();
        group.comment = comment.to_string();
        Ok(())
    }

    /// Sets the persisted expanded state of a group
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the group does not exist.
    pub fn set_group_expanded(&mut self, id: GroupId, expanded: bool) -> StoreResult<()> {
        self.group_mut(id)?.expanded = expanded;
        Ok(())
    }

    /// Deletes a group with all descendant groups and computers
    ///
    /// Returns what was removed besides the group itself.
    ///
    /// # Errors
    ///
    /// Returns `CannotDeleteRoot` for the root, `NotFound` if the group does
    /// not exist.
    pub fn delete_group(&mut self, id: GroupId) -> StoreResult<SubtreeStats> {
        let parent = self.require_group(id)?.parent.ok_or(StoreError::CannotDeleteRoot)?;
        let stats = self.subtree_stats(id)?;

        for gid in self.collect_subtree(id) {
            if let Some(group) = self.groups.remove(&gid) {
                for cid in &group.computers {
                    self.computers.remove(cid);
                }
            }
        }
        self.group_mut(parent)?.groups.retain(|g| *g != id);
        Ok(stats)
    }

    /// Moves a group to the end of `new_parent`'s child list
    ///
    /// Moving a group under its current parent leaves it in place.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if either group does not exist, `CannotMoveRoot`
    /// for the root, `CycleDetected` if `new_parent` is the group itself or
    /// one of its descendants.
    pub fn move_group(&mut self, id: GroupId, new_parent: GroupId) -> StoreResult<()> {
        let old_parent = self.require_group(id)?.parent.ok_or(StoreError::CannotMoveRoot)?;
        self.require_group(new_parent)?;

        if self.would_create_cycle(id, new_parent) {
            return Err(StoreError::CycleDetected {
                group: id,
                new_parent,
            });
        }
        if old_parent == new_parent {
            return Ok(());
        }

        self.group_mut(old_parent)?.groups.retain(|g| *g != id);
        self.group_mut(new_parent)?.groups.push(id);
        self.group_mut(id)?.parent = Some(new_parent);
        Ok(())
    }

    /// Moves a group to `index` among its siblings (clamped to the last slot)
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the group does not exist, `CannotMoveRoot` for
    /// the root.
    pub fn reorder_group(&mut self, id: GroupId, index: usize) -> StoreResult<()> {
        let parent = self.require_group(id)?.parent.ok_or(StoreError::CannotMoveRoot)?;
        move_within(&mut self.group_mut(parent)?.groups, id, index);
        Ok(())
    }

    // ========== Computer mutations ==========

    /// Adds a computer at the end of `parent`'s computer list
    ///
    /// The computer keeps its id; its `group` is set to `parent`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad fields, `DuplicateId` if the id is
    /// already used, `NotFound` if the group does not exist.
    pub fn add_computer(
        &mut self,
        parent: GroupId,
        mut computer: Computer,
    ) -> StoreResult<ComputerId> {
        validate_computer(&computer)?;
        if self.computers.contains_key(&computer.id) {
            return Err(StoreError::DuplicateId(computer.id));
        }
        self.require_group(parent)?;

        let id = computer.id;
        computer.group = parent;
        self.computers.insert(id, computer);
        self.group_mut(parent)?.computers.push(id);
        Ok(id)
    }

    /// Replaces a computer's data
    ///
    /// Preserves the original id, owning group and creation timestamp and
    /// refreshes `modified_at`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the computer does not exist, `Validation` for
    /// bad fields.
    pub fn update_computer(&mut self, id: ComputerId, mut updated: Computer) -> StoreResult<()> {
        let existing = self
            .computers
            .get(&id)
            .ok_or(StoreError::computer_not_found(id))?;
        validate_computer(&updated)?;

        updated.id = existing.id;
        updated.group = existing.group;
        updated.created_at = existing.created_at;
        updated.touch();

        self.computers.insert(id, updated);
        Ok(())
    }

    /// Removes a computer and returns it
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the computer does not exist.
    pub fn delete_computer(&mut self, id: ComputerId) -> StoreResult<Computer> {
        let computer = self
            .computers
            .remove(&id)
            .ok_or(StoreError::computer_not_found(id))?;
        if let Some(group) = self.groups.get_mut(&computer.group) {
            group.computers.retain(|c| *c != id);
        }
        Ok(computer)
    }

    /// Moves a computer to the end of another group's computer list
    ///
    /// Moving to the current group leaves it in place.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the computer or group does not exist.
    pub fn move_computer(&mut self, id: ComputerId, new_parent: GroupId) -> StoreResult<()> {
        let old_parent = self.require_computer(id)?.group;
        self.require_group(new_parent)?;
        if old_parent == new_parent {
            return Ok(());
        }

        self.group_mut(old_parent)?.computers.retain(|c| *c != id);
        self.group_mut(new_parent)?.computers.push(id);
        if let Some(computer) = self.computers.get_mut(&id) {
            computer.group = new_parent;
        }
        Ok(())
    }

    /// Moves a computer to `index` within its group (clamped to the last slot)
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the computer does not exist.
    pub fn reorder_computer(&mut self, id: ComputerId, index: usize) -> StoreResult<()> {
        let parent = self.require_computer(id)?.group;
        move_within(&mut self.group_mut(parent)?.computers, id, index);
        Ok(())
    }

    /// Copies a computer into the same group, right after the original
    ///
    /// The copy gets a fresh id, fresh timestamps and the name suffixed with
    /// " (copy)", shortened to fit the name limit.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the computer does not exist.
    pub fn copy_computer(&mut self, id: ComputerId) -> StoreResult<ComputerId> {
        let original = self.require_computer(id)?;
        let mut copy = original.duplicate();
        copy.name = copy_name(&original.name);

        let copy_id = copy.id;
        let parent = copy.group;
        self.computers.insert(copy_id, copy);

        let list = &mut self.group_mut(parent)?.computers;
        let position = list.iter().position(|c| *c == id).map_or(list.len(), |p| p + 1);
        list.insert(position, copy_id);
        Ok(copy_id)
    }

    // ========== Construction from decoded data ==========

    /// Attaches a decoded group; its parent must already be present
    pub(crate) fn attach_decoded_group(&mut self, group: Group) -> Result<(), String> {
        if self.groups.contains_key(&group.id) {
            return Err(format!("duplicate group id {}", group.id));
        }
        let parent_id = group
            .parent
            .ok_or_else(|| format!("group {} is a second root", group.id))?;
        let parent = self
            .groups
            .get_mut(&parent_id)
            .ok_or_else(|| format!("group {} references unknown parent {parent_id}", group.id))?;
        parent.groups.push(group.id);
        self.groups.insert(group.id, group);
        Ok(())
    }

    /// Attaches a decoded computer to its `group`
    pub(crate) fn attach_decoded_computer(&mut self, computer: Computer) -> Result<(), String> {
        if self.computers.contains_key(&computer.id) {
            return Err(format!("duplicate computer id {}", computer.id));
        }
        let group = self.groups.get_mut(&computer.group).ok_or_else(|| {
            format!(
                "computer {} references unknown group {}",
                computer.id, computer.group
            )
        })?;
        group.computers.push(computer.id);
        self.computers.insert(computer.id, computer);
        Ok(())
    }

    // ========== Internals ==========

    fn require_group(&self, id: GroupId) -> StoreResult<&Group> {
        self.groups.get(&id).ok_or(StoreError::group_not_found(id))
    }

    fn require_computer(&self, id: ComputerId) -> StoreResult<&Computer> {
        self.computers
            .get(&id)
            .ok_or(StoreError::computer_not_found(id))
    }

    fn group_mut(&mut self, id: GroupId) -> StoreResult<&mut Group> {
        self.groups
            .get_mut(&id)
            .ok_or(StoreError::group_not_found(id))
    }

    /// Collects a group and all its descendant groups in pre-order
    fn collect_subtree(&self, id: GroupId) -> Vec<GroupId> {
        let mut result = Vec::new();
        let mut to_process = vec![id];

        while let Some(current) = to_process.pop() {
            result.push(current);
            if let Some(group) = self.groups.get(&current) {
                to_process.extend(group.groups.iter().rev());
            }
        }
        result
    }

    /// Checks if moving `group` under `new_parent` would create a cycle
    fn would_create_cycle(&self, group: GroupId, new_parent: GroupId) -> bool {
        let mut current = Some(new_parent);
        while let Some(id) = current {
            if id == group {
                return true;
            }
            current = self.groups.get(&id).and_then(|g| g.parent);
        }
        false
    }
}

fn validate_computer(computer: &Computer) -> StoreResult<()> {
    validate_name(&computer.name)?;
    validate_comment(&computer.comment)?;
    validate_username(&computer.connection.username)?;
    if let Some(router) = &computer.connection.router {
        validate_username(&router.username)?;
    }
    Ok(())
}

fn copy_name(name: &str) -> String {
    let room = MAX_NAME_LENGTH - COPY_SUFFIX.chars().count();
    let base: String = name.chars().take(room).collect();
    format!("{base}{COPY_SUFFIX}")
}

fn move_within<T: PartialEq + Copy>(list: &mut Vec<T>, item: T, index: usize) {
    if let Some(current) = list.iter().position(|x| *x == item) {
        list.remove(current);
        let index = index.min(list.len());
        list.insert(index, item);
    }
}

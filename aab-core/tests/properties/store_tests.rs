//! Property-based tests for the group tree and address book files

use aab_core::store::{AddressBook, Tree};
use aab_core::models::{BookProperties, Computer, GroupId};
use aab_core::{EncryptionMode, OpenError, StoreError};
use proptest::prelude::*;
use secrecy::SecretString;
use tempfile::TempDir;

use super::{FAST_KDF, arb_step, build_tree};

/// Non-root groups of `tree` in walk order
fn non_root_groups(tree: &Tree) -> Vec<GroupId> {
    tree.group_ids_preorder()
        .into_iter()
        .filter(|id| *id != tree.root_id())
        .collect()
}

/// `group` and every group below it
fn descendants(tree: &Tree, group: GroupId) -> Vec<GroupId> {
    let mut found = vec![group];
    let mut index = 0;
    while index < found.len() {
        let children = tree.child_groups(found[index]).unwrap();
        found.extend(children.iter().map(|child| child.id));
        index += 1;
    }
    found
}

fn encrypted_book(tree_steps: &[super::Step], password: &str) -> AddressBook {
    let source = build_tree(tree_steps);
    let mut book = AddressBook::new(BookProperties::new("Book")).unwrap();
    copy_tree(&source, &mut book);
    book.set_kdf_params(FAST_KDF).unwrap();
    book.set_encryption(
        EncryptionMode::ChaCha20Poly1305,
        Some(SecretString::from(password)),
    )
    .unwrap();
    book
}

/// Replays the groups and computers of `source` into `book`
fn copy_tree(source: &Tree, book: &mut AddressBook) {
    let mut mapping = vec![(source.root_id(), book.tree().root_id())];
    for id in source.group_ids_preorder() {
        let target = mapping
            .iter()
            .find(|(from, _)| *from == id)
            .map(|(_, to)| *to)
            .unwrap();
        for child in source.child_groups(id).unwrap() {
            let new_id = book.add_group(target, &child.name, &child.comment).unwrap();
            mapping.push((child.id, new_id));
        }
        for computer in source.computers_in(id).unwrap() {
            book.add_computer(target, computer.clone()).unwrap();
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Deleting a group removes it with all descendant groups and computers
    #[test]
    fn delete_group_cascades(
        steps in prop::collection::vec(arb_step(), 1..40),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut tree = build_tree(&steps);
        let groups = non_root_groups(&tree);
        prop_assume!(!groups.is_empty());
        let target = groups[pick.index(groups.len())];

        let before_groups = tree.group_count();
        let before_computers = tree.computer_count();
        let expected = tree.subtree_stats(target).unwrap();
        let removed_groups = descendants(&tree, target);

        let stats = tree.delete_group(target).unwrap();
        prop_assert_eq!(stats, expected);
        prop_assert_eq!(tree.group_count(), before_groups - stats.groups - 1);
        prop_assert_eq!(tree.computer_count(), before_computers - stats.computers);
        for id in removed_groups {
            prop_assert!(tree.group(id).is_none());
        }
        prop_assert!(tree.computers().all(|c| tree.group(c.group).is_some()));
    }

    /// Moving a group under itself or a descendant is rejected and changes nothing
    #[test]
    fn move_group_rejects_cycles(
        steps in prop::collection::vec(arb_step(), 1..40),
        pick in any::<prop::sample::Index>(),
        target in any::<prop::sample::Index>(),
    ) {
        let mut tree = build_tree(&steps);
        let groups = non_root_groups(&tree);
        prop_assume!(!groups.is_empty());
        let group = groups[pick.index(groups.len())];
        let below = descendants(&tree, group);
        let new_parent = below[target.index(below.len())];

        let before = tree.clone();
        let result = tree.move_group(group, new_parent);
        let is_cycle = matches!(result, Err(StoreError::CycleDetected { .. }));
        prop_assert!(is_cycle);
        prop_assert_eq!(tree, before);
    }

    /// Moving a group anywhere outside its own subtree keeps every item reachable
    #[test]
    fn move_group_preserves_items(
        steps in prop::collection::vec(arb_step(), 1..40),
        pick in any::<prop::sample::Index>(),
        target in any::<prop::sample::Index>(),
    ) {
        let mut tree = build_tree(&steps);
        let groups = non_root_groups(&tree);
        prop_assume!(!groups.is_empty());
        let group = groups[pick.index(groups.len())];
        let below = descendants(&tree, group);
        let candidates: Vec<GroupId> = tree
            .group_ids_preorder()
            .into_iter()
            .filter(|id| !below.contains(id))
            .collect();
        let new_parent = candidates[target.index(candidates.len())];

        let groups_before = tree.group_count();
        let computers_before = tree.computer_count();
        tree.move_group(group, new_parent).unwrap();

        prop_assert_eq!(tree.group(group).unwrap().parent, Some(new_parent));
        prop_assert_eq!(tree.group_count(), groups_before);
        prop_assert_eq!(tree.computer_count(), computers_before);
        prop_assert_eq!(tree.walk().len(), groups_before + computers_before);
    }

    /// The root group can be neither deleted nor moved
    #[test]
    fn root_is_immovable(
        steps in prop::collection::vec(arb_step(), 0..20),
        target in any::<prop::sample::Index>(),
    ) {
        let mut tree = build_tree(&steps);
        let root = tree.root_id();
        let all = tree.group_ids_preorder();
        let new_parent = all[target.index(all.len())];
        let before = tree.clone();

        prop_assert!(matches!(tree.delete_group(root), Err(StoreError::CannotDeleteRoot)));
        prop_assert!(matches!(tree.move_group(root, new_parent), Err(StoreError::CannotMoveRoot)));
        prop_assert_eq!(tree, before);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Saving and reopening an encrypted book restores the same tree
    #[test]
    fn encrypted_file_round_trip(
        steps in prop::collection::vec(arb_step(), 0..20),
        password in "[a-zA-Z0-9!@#$%]{8,24}",
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("book.aab");
        let mut book = encrypted_book(&steps, &password);
        book.save_to(&path).unwrap();
        prop_assert!(!book.is_dirty());

        let reopened = AddressBook::open(&path, Some(&SecretString::from(password))).unwrap();
        prop_assert_eq!(reopened.encryption(), EncryptionMode::ChaCha20Poly1305);
        prop_assert_eq!(reopened.properties(), book.properties());
        prop_assert_eq!(reopened.tree(), book.tree());
        prop_assert!(!reopened.is_dirty());
    }

    /// Flipping one bit of the sealed payload is always an authentication failure
    #[test]
    fn encrypted_file_detects_tampering(
        steps in prop::collection::vec(arb_step(), 0..10),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("book.aab");
        encrypted_book(&steps, "Str0ngPass!").save_to(&path).unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        let start = 6;
        let offset = start + position.index(bytes.len() - start);
        bytes[offset] ^= 1 << bit;
        std::fs::write(&path, &bytes).unwrap();

        let result = AddressBook::open(&path, Some(&SecretString::from("Str0ngPass!")));
        prop_assert!(matches!(result, Err(OpenError::WrongPasswordOrTampered)));
    }
}

#[test]
fn office_book_scenario() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("office.aab");

    let mut book = AddressBook::new(BookProperties::new("Work")).unwrap();
    let root = book.tree().root_id();
    let office = book.add_group(root, "Office", "").unwrap();
    let pc = book
        .add_computer(office, Computer::new("PC1", "192.168.1.5"))
        .unwrap();
    book.set_kdf_params(FAST_KDF).unwrap();
    book.set_encryption(
        EncryptionMode::ChaCha20Poly1305,
        Some(SecretString::from("Str0ngPass!")),
    )
    .unwrap();
    book.save_to(&path).unwrap();

    let contents = std::fs::read(&path).unwrap();
    assert!(!contents.windows(6).any(|w| w == b"Office"));

    let reopened = AddressBook::open(&path, Some(&SecretString::from("Str0ngPass!"))).unwrap();
    let tree = reopened.tree();
    let office_id = tree.find_group_by_path("Office").unwrap();
    let computers = tree.computers_in(office_id).unwrap();
    assert_eq!(computers.len(), 1);
    assert_eq!(computers[0].id, pc);
    assert_eq!(computers[0].name, "PC1");
    assert_eq!(computers[0].connection.address_or_id, "192.168.1.5");
    assert_eq!(tree.computer_path(pc).as_deref(), Some("Office/PC1"));

    assert!(matches!(
        AddressBook::open(&path, Some(&SecretString::from("wrong-pass"))),
        Err(OpenError::WrongPasswordOrTampered)
    ));
    assert!(matches!(
        AddressBook::open(&path, None),
        Err(OpenError::PasswordRequired)
    ));
    assert_eq!(
        AddressBook::peek_encryption(&path).unwrap(),
        EncryptionMode::ChaCha20Poly1305
    );
}

#[test]
fn failed_mutation_keeps_book_clean() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.aab");
    let mut book = AddressBook::new(BookProperties::new("Book")).unwrap();
    book.save_to(&path).unwrap();

    let root = book.tree().root_id();
    let before = book.tree().clone();
    assert!(book.add_group(root, "", "").is_err());
    assert!(book.delete_group(root).is_err());
    assert!(!book.is_dirty());
    assert_eq!(book.tree(), &before);
}

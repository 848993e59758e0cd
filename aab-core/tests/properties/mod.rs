//! Property-based tests for the address book core library

mod codec_tests;
mod crypto_tests;
mod resolver_tests;
mod store_tests;
mod validation_tests;

use aab_core::KdfParams;
use aab_core::models::{Computer, GroupId, SessionType};
use aab_core::store::Tree;
use proptest::prelude::*;

/// Cheapest Argon2id cost accepted by the file format
pub const FAST_KDF: KdfParams = KdfParams::new(1024, 1, 1);

/// One step of tree construction; indices pick an existing group
#[derive(Debug, Clone)]
pub enum Step {
    Group { parent: usize, name: String },
    Computer {
        parent: usize,
        name: String,
        address: String,
        username: String,
        session: SessionType,
    },
}

pub fn arb_name() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9 _.-]{0,31}"
}

pub fn arb_address() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9-]{0,15}(\\.[a-z]{2,6})?(:[1-9][0-9]{0,3})?",
        "[0-9]{1,9}",
    ]
}

pub fn arb_session() -> impl Strategy<Value = SessionType> {
    prop::sample::select(SessionType::ALL.to_vec())
}

pub fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (any::<usize>(), arb_name()).prop_map(|(parent, name)| Step::Group { parent, name }),
        (
            any::<usize>(),
            arb_name(),
            arb_address(),
            "[a-z_.-]{0,12}",
            arb_session()
        )
            .prop_map(|(parent, name, address, username, session)| Step::Computer {
                parent,
                name,
                address,
                username,
                session,
            }),
    ]
}

pub fn build_tree(steps: &[Step]) -> Tree {
    let mut tree = Tree::new();
    let mut groups: Vec<GroupId> = vec![tree.root_id()];
    for step in steps {
        match step {
            Step::Group { parent, name } => {
                let parent = groups[parent % groups.len()];
                let id = tree.add_group(parent, name, "").unwrap();
                groups.push(id);
            }
            Step::Computer {
                parent,
                name,
                address,
                username,
                session,
            } => {
                let parent = groups[parent % groups.len()];
                let computer = Computer::new(name.clone(), address.clone())
                    .with_credentials(username.clone(), "secret")
                    .with_session_type(*session);
                tree.add_computer(parent, computer).unwrap();
            }
        }
    }
    tree
}

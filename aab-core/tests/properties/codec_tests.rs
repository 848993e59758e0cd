//! Property-based tests for the payload codec
//!
//! Trees are built through the public mutation API so every generated tree
//! satisfies the store invariants.

use aab_core::codec::{self, CodecError, PAYLOAD_MAGIC};
use aab_core::models::{BookProperties, RouterConfig};
use proptest::prelude::*;

use super::{arb_name, arb_step, build_tree};

fn arb_properties() -> impl Strategy<Value = BookProperties> {
    (arb_name(), "[a-zA-Z0-9 .,!?-]{0,64}", any::<bool>()).prop_map(|(name, comment, router)| {
        let properties = BookProperties::new(name).with_comment(comment);
        if router {
            properties.with_router(RouterConfig::new("router.local:8060", "admin", "pw"))
        } else {
            properties
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Decoding an encoded book yields the same properties and tree
    #[test]
    fn codec_round_trip(
        properties in arb_properties(),
        steps in prop::collection::vec(arb_step(), 0..40),
    ) {
        let tree = build_tree(&steps);
        let bytes = codec::encode(&properties, &tree).unwrap();
        let (decoded_properties, decoded_tree) = codec::decode(&bytes).unwrap();

        prop_assert_eq!(decoded_properties, properties);
        prop_assert_eq!(decoded_tree.group_count(), tree.group_count());
        prop_assert_eq!(decoded_tree.computer_count(), tree.computer_count());
        prop_assert_eq!(decoded_tree, tree);
    }

    /// Encoding the same book twice gives identical bytes
    #[test]
    fn codec_is_deterministic(
        properties in arb_properties(),
        steps in prop::collection::vec(arb_step(), 0..20),
    ) {
        let tree = build_tree(&steps);
        let first = codec::encode(&properties, &tree).unwrap();
        let second = codec::encode(&properties, &tree).unwrap();
        prop_assert_eq!(&*first, &*second);
    }

    /// Truncated payloads are rejected, never decoded into a partial tree
    #[test]
    fn codec_rejects_truncation(
        steps in prop::collection::vec(arb_step(), 1..20),
        cut in any::<prop::sample::Index>(),
    ) {
        let tree = build_tree(&steps);
        let bytes = codec::encode(&BookProperties::default(), &tree).unwrap();
        let len = cut.index(bytes.len());
        prop_assert!(codec::decode(&bytes[..len]).is_err());
    }

    /// Anything not starting with the payload magic is an unknown format
    #[test]
    fn codec_rejects_foreign_bytes(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        prop_assume!(!bytes.starts_with(PAYLOAD_MAGIC));
        prop_assert!(matches!(codec::decode(&bytes), Err(CodecError::UnknownFormat)));
    }
}

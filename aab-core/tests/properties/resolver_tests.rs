//! Property-based tests for connection resolution

use aab_core::models::{Computer, RouterConfig};
use aab_core::resolver::{ConfigError, ResolvedConnection, merge_router, resolve};
use proptest::prelude::*;
use secrecy::ExposeSecret;

fn arb_host_id() -> impl Strategy<Value = String> {
    "[0-9]{1,12}"
}

fn arb_direct_address() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,15}(\\.[a-z]{2,6})?(:[1-9][0-9]{0,3})?"
}

fn arb_username() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.-]{0,16}"
}

// Strategy for a router with every field set
fn arb_router() -> impl Strategy<Value = RouterConfig> {
    (
        "[a-z][a-z0-9]{0,10}(:[1-9][0-9]{0,3})?",
        "[a-z][a-z0-9_]{0,10}",
        "[a-zA-Z0-9]{1,16}",
    )
        .prop_map(|(address, username, password)| RouterConfig::new(address, username, password))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Addresses that are not host ids connect directly and ignore routers
    #[test]
    fn direct_address_ignores_router(
        address in arb_direct_address(),
        username in arb_username(),
        router in proptest::option::of(arb_router()),
    ) {
        let computer = Computer::new("PC", address.clone()).with_credentials(username.clone(), "pw");
        let resolved = resolve(&computer, router.as_ref()).unwrap();
        prop_assert!(!resolved.is_router());
        prop_assert_eq!(resolved.username(), username.as_str());
        match resolved {
            ResolvedConnection::Direct { address: resolved_address, .. } => {
                prop_assert_eq!(resolved_address, address);
            }
            ResolvedConnection::Router { .. } => prop_assert!(false, "expected direct connection"),
        }
    }

    /// A host id with a book router resolves through that router
    #[test]
    fn host_id_uses_book_router(host_id in arb_host_id(), book in arb_router()) {
        let computer = Computer::new("PC", host_id.clone());
        let resolved = resolve(&computer, Some(&book)).unwrap();
        prop_assert_eq!(resolved.router(), Some(&book));
        match resolved {
            ResolvedConnection::Router { host_id: resolved_id, .. } => {
                prop_assert_eq!(resolved_id, host_id);
            }
            ResolvedConnection::Direct { .. } => prop_assert!(false, "expected router connection"),
        }
    }

    /// A host id without any router is a configuration error
    #[test]
    fn host_id_without_router_fails(host_id in arb_host_id()) {
        let computer = Computer::new("PC", host_id);
        prop_assert!(matches!(
            resolve(&computer, None),
            Err(ConfigError::RouterNotConfigured)
        ));
    }

    /// Computer router fields win; empty ones fall back to the book router
    #[test]
    fn merge_prefers_computer_fields(
        computer in arb_router(),
        book in arb_router(),
        clear_address in any::<bool>(),
        clear_username in any::<bool>(),
        clear_password in any::<bool>(),
    ) {
        let own = RouterConfig::new(
            if clear_address { String::new() } else { computer.address.clone() },
            if clear_username { String::new() } else { computer.username.clone() },
            if clear_password { String::new() } else { computer.password.expose_secret().to_string() },
        );
        let merged = merge_router(Some(&own), Some(&book)).unwrap();

        let expected_address = if clear_address { &book.address } else { &computer.address };
        let expected_username = if clear_username { &book.username } else { &computer.username };
        let expected_password = if clear_password { &book.password } else { &computer.password };
        prop_assert_eq!(&merged.address, expected_address);
        prop_assert_eq!(&merged.username, expected_username);
        prop_assert_eq!(merged.password.expose_secret(), expected_password.expose_secret());
    }

    /// A merged router without a password is rejected
    #[test]
    fn router_without_password_fails(host_id in arb_host_id(), router in arb_router()) {
        let book = RouterConfig::new(router.address.clone(), router.username.clone(), "");
        let computer = Computer::new("PC", host_id);
        prop_assert!(matches!(
            resolve(&computer, Some(&book)),
            Err(ConfigError::RouterPasswordEmpty)
        ));
    }
}

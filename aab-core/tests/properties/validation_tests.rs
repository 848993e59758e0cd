//! Property-based tests for input validation

use aab_core::ValidationError;
use aab_core::validation::{
    DEFAULT_HOST_PORT, HostAddress, MAX_NAME_LENGTH, validate_name, validate_username,
};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any non-empty name up to the limit is accepted, counted in characters
    #[test]
    fn names_within_limit_accepted(name in "\\PC{1,64}") {
        prop_assert!(validate_name(&name).is_ok());
    }

    /// Names over the limit are rejected
    #[test]
    fn long_names_rejected(name in "[a-zA-Zа-я]{65,100}") {
        prop_assert_eq!(
            validate_name(&name),
            Err(ValidationError::NameTooLong { max: MAX_NAME_LENGTH })
        );
    }

    /// User names from the allowed alphabet pass
    #[test]
    fn username_charset_accepted(name in "[A-Za-z0-9_.-]{0,64}") {
        prop_assert!(validate_username(&name).is_ok());
    }

    /// Any character outside the alphabet fails the whole user name
    #[test]
    fn username_foreign_char_rejected(
        prefix in "[A-Za-z0-9_.-]{0,10}",
        bad in "[ @/\\\\:;!#$%^&*()ä]",
        suffix in "[A-Za-z0-9_.-]{0,10}",
    ) {
        let name = format!("{prefix}{bad}{suffix}");
        prop_assert_eq!(validate_username(&name), Err(ValidationError::InvalidUserName));
    }

    /// Formatting a parsed address and parsing it again is stable
    #[test]
    fn host_address_display_reparses(
        host in "[a-z][a-z0-9-]{0,20}(\\.[a-z]{2,6})?",
        port in proptest::option::of(1u16..=65535),
    ) {
        let input = match port {
            Some(port) => format!("{host}:{port}"),
            None => host.clone(),
        };
        let parsed = HostAddress::parse(&input).unwrap();
        prop_assert_eq!(&parsed.host, &host);
        prop_assert_eq!(parsed.port, port.unwrap_or(DEFAULT_HOST_PORT));
        prop_assert_eq!(HostAddress::parse(&parsed.to_string()).unwrap(), parsed);
    }

    /// IPv6 literals survive the bracketed display form
    #[test]
    fn ipv6_display_reparses(segments in prop::collection::vec(0u16..=0xffff, 8), port in 1u16..=65535) {
        let host = segments
            .iter()
            .map(|s| format!("{s:x}"))
            .collect::<Vec<_>>()
            .join(":");
        let parsed = HostAddress::parse(&format!("[{host}]:{port}")).unwrap();
        prop_assert_eq!(&parsed.host, &host);
        prop_assert_eq!(parsed.port, port);
        prop_assert_eq!(HostAddress::parse(&parsed.to_string()).unwrap(), parsed);
    }
}

//! Property-based tests for the encryption envelope

use aab_core::KdfParams;
use aab_core::crypto::{self, DecryptError, EncryptionMode, NONCE_LEN, SALT_LEN, TAG_LEN};
use proptest::prelude::*;
use ring::rand::SystemRandom;

use super::FAST_KDF;

const AAD: &[u8] = b"AABK\x01\x01";

fn arb_password() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9!@#$%^&*]{1,64}"
}

fn seal(payload: &[u8], password: &str) -> Vec<u8> {
    crypto::seal(
        payload,
        Some(password),
        EncryptionMode::ChaCha20Poly1305,
        AAD,
        &FAST_KDF,
        &SystemRandom::new(),
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Opening with the sealing password returns the payload
    #[test]
    fn envelope_round_trip(
        payload in prop::collection::vec(any::<u8>(), 0..1024),
        password in arb_password(),
    ) {
        let sealed = seal(&payload, &password);
        prop_assert_eq!(
            sealed.len(),
            KdfParams::ENCODED_LEN + SALT_LEN + NONCE_LEN + payload.len() + TAG_LEN
        );
        let opened = crypto::open(
            &sealed,
            Some(&password),
            EncryptionMode::ChaCha20Poly1305,
            AAD,
        )
        .unwrap();
        prop_assert_eq!(&*opened, &payload);
    }

    /// Flipping any bit of the sealed bytes fails authentication, including
    /// the stored KDF parameters
    #[test]
    fn envelope_detects_bit_flip(
        payload in prop::collection::vec(any::<u8>(), 1..256),
        password in arb_password(),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let mut sealed = seal(&payload, &password);
        let offset = position.index(sealed.len());
        sealed[offset] ^= 1 << bit;

        let result = crypto::open(
            &sealed,
            Some(&password),
            EncryptionMode::ChaCha20Poly1305,
            AAD,
        );
        prop_assert!(matches!(result, Err(DecryptError::AuthenticationFailed)));
    }

    /// A different password fails exactly like tampering
    #[test]
    fn envelope_rejects_wrong_password(
        payload in prop::collection::vec(any::<u8>(), 0..256),
        password in arb_password(),
        other in arb_password(),
    ) {
        prop_assume!(password != other);
        let sealed = seal(&payload, &password);
        let result = crypto::open(
            &sealed,
            Some(&other),
            EncryptionMode::ChaCha20Poly1305,
            AAD,
        );
        prop_assert!(matches!(result, Err(DecryptError::AuthenticationFailed)));
    }

    /// Two seals of the same payload never share salt or nonce
    #[test]
    fn envelope_uses_fresh_randomness(payload in prop::collection::vec(any::<u8>(), 0..64)) {
        let first = seal(&payload, "password");
        let second = seal(&payload, "password");
        let random = KdfParams::ENCODED_LEN..KdfParams::ENCODED_LEN + SALT_LEN + NONCE_LEN;
        prop_assert_ne!(&first[random.clone()], &second[random]);
    }

    /// Without encryption the payload passes through untouched
    #[test]
    fn plain_mode_is_identity(payload in prop::collection::vec(any::<u8>(), 0..256)) {
        let sealed = crypto::seal(
            &payload,
            None,
            EncryptionMode::None,
            AAD,
            &FAST_KDF,
            &SystemRandom::new(),
        )
        .unwrap();
        prop_assert_eq!(&sealed, &payload);
        let opened = crypto::open(&sealed, None, EncryptionMode::None, AAD).unwrap();
        prop_assert_eq!(&*opened, &payload);
    }
}

//! Sealing and opening payloads.
//!
//! Sealed layout for [`EncryptionMode::ChaCha20Poly1305`]:
//!
//! ```text
//! [memory_kib u32 LE][iterations u32 LE][parallelism u32 LE]
//! [salt 16][nonce 12][ciphertext][tag 16]
//! ```
//!
//! The caller's associated data followed by the encoded KDF parameters is
//! authenticated along with the ciphertext.

use ring::aead::{
    Aad, CHACHA20_POLY1305, LessSafeKey, NONCE_LEN as AEAD_NONCE_LEN, Nonce, UnboundKey,
};
use ring::rand::SecureRandom;
use thiserror::Error;
use zeroize::Zeroizing;

use super::EncryptionMode;
use super::kdf::{KdfParams, derive_key};

/// Maximum password length accepted by the envelope, in bytes
pub const MAX_PASSWORD_BYTES: usize = 256;
/// Salt length in bytes
pub const SALT_LEN: usize = 16;
/// Nonce length in bytes
pub const NONCE_LEN: usize = AEAD_NONCE_LEN;
/// Authentication tag length in bytes
pub const TAG_LEN: usize = 16;

const HEADER_LEN: usize = KdfParams::ENCODED_LEN + SALT_LEN + NONCE_LEN;

/// Failures while sealing a payload
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Password missing, empty or longer than [`MAX_PASSWORD_BYTES`]
    #[error("Password can not be empty and should not exceed {max} bytes")]
    InvalidPassword {
        /// Maximum allowed length in bytes
        max: usize,
    },

    /// Key derivation failed
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// The random source failed
    #[error("Failed to generate random bytes")]
    Random,

    /// The cipher rejected the input
    #[error("Encryption failed")]
    Seal,
}

/// Failures while opening a sealed payload
///
/// A wrong password and a modified ciphertext are indistinguishable and
/// both surface as [`DecryptError::AuthenticationFailed`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecryptError {
    /// Wrong password or tampered data
    #[error("Authentication failed: wrong password or modified data")]
    AuthenticationFailed,

    /// The payload is encrypted and no password was supplied
    #[error("A password is required to open this payload")]
    PasswordRequired,

    /// Sealed bytes are too short to hold the header and tag
    #[error("Malformed encrypted payload: {0}")]
    Malformed(String),
}

/// Seals `payload` under `mode`
///
/// `aad` is authenticated but not stored; the same bytes must be passed to
/// [`open`]. Salt and nonce are drawn from `rng` on every call.
///
/// # Errors
///
/// Returns an error if the password is missing or too long, key derivation
/// fails, or the random source fails.
pub fn seal(
    payload: &[u8],
    password: Option<&str>,
    mode: EncryptionMode,
    aad: &[u8],
    params: &KdfParams,
    rng: &dyn SecureRandom,
) -> Result<Vec<u8>, EnvelopeError> {
    match mode {
        EncryptionMode::None => Ok(payload.to_vec()),
        EncryptionMode::ChaCha20Poly1305 => {
            let password = password
                .filter(|p| !p.is_empty() && p.len() <= MAX_PASSWORD_BYTES)
                .ok_or(EnvelopeError::InvalidPassword {
                    max: MAX_PASSWORD_BYTES,
                })?;
            seal_chacha(payload, password, aad, params, rng)
        }
    }
}

fn seal_chacha(
    payload: &[u8],
    password: &str,
    aad: &[u8],
    params: &KdfParams,
    rng: &dyn SecureRandom,
) -> Result<Vec<u8>, EnvelopeError> {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut salt).map_err(|_| EnvelopeError::Random)?;
    rng.fill(&mut nonce_bytes).map_err(|_| EnvelopeError::Random)?;

    let params_bytes = params.to_bytes();
    let key = derive_key(password.as_bytes(), &salt, params)
        .map_err(EnvelopeError::KeyDerivation)?;
    let sealing_key = aead_key(key.as_slice()).ok_or(EnvelopeError::Seal)?;

    let mut in_out = Zeroizing::new(payload.to_vec());
    sealing_key
        .seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::from(associated_data(aad, &params_bytes)),
            &mut *in_out,
        )
        .map_err(|_| EnvelopeError::Seal)?;

    let mut output = Vec::with_capacity(HEADER_LEN + in_out.len());
    output.extend_from_slice(&params_bytes);
    output.extend_from_slice(&salt);
    output.extend_from_slice(&nonce_bytes);
    output.extend_from_slice(&in_out);
    Ok(output)
}

/// Opens bytes produced by [`seal`]
///
/// # Errors
///
/// - [`DecryptError::PasswordRequired`] if `mode` is encrypted and no
///   password (or an empty one) was given
/// - [`DecryptError::Malformed`] if the sealed bytes are truncated
/// - [`DecryptError::AuthenticationFailed`] for a wrong password or any
///   modification of the sealed bytes or `aad`, including KDF parameters
///   outside the accepted bounds
pub fn open(
    sealed: &[u8],
    password: Option<&str>,
    mode: EncryptionMode,
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>, DecryptError> {
    match mode {
        EncryptionMode::None => Ok(Zeroizing::new(sealed.to_vec())),
        EncryptionMode::ChaCha20Poly1305 => {
            let password = password
                .filter(|p| !p.is_empty())
                .ok_or(DecryptError::PasswordRequired)?;
            if password.len() > MAX_PASSWORD_BYTES {
                return Err(DecryptError::AuthenticationFailed);
            }
            open_chacha(sealed, password, aad)
        }
    }
}

fn open_chacha(
    sealed: &[u8],
    password: &str,
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>, DecryptError> {
    if sealed.len() < HEADER_LEN + TAG_LEN {
        return Err(DecryptError::Malformed(format!(
            "encrypted payload is {} bytes, at least {} expected",
            sealed.len(),
            HEADER_LEN + TAG_LEN
        )));
    }

    let (params_bytes, rest) = sealed.split_at(KdfParams::ENCODED_LEN);
    let (salt, rest) = rest.split_at(SALT_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let mut encoded_params = [0u8; KdfParams::ENCODED_LEN];
    encoded_params.copy_from_slice(params_bytes);
    let params = KdfParams::from_bytes(&encoded_params);
    // Parameters are authenticated data: out-of-bounds values count as tampering
    if let Err(reason) = params.validate() {
        tracing::debug!(%reason, "Rejected KDF parameters of sealed payload");
        return Err(DecryptError::AuthenticationFailed);
    }

    let mut nonce_array = [0u8; NONCE_LEN];
    nonce_array.copy_from_slice(nonce_bytes);

    let key = derive_key(password.as_bytes(), salt, &params)
        .map_err(|_| DecryptError::AuthenticationFailed)?;
    let opening_key = aead_key(key.as_slice()).ok_or(DecryptError::AuthenticationFailed)?;

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let plaintext_len = opening_key
        .open_in_place(
            Nonce::assume_unique_for_key(nonce_array),
            Aad::from(associated_data(aad, &encoded_params)),
            in_out.as_mut_slice(),
        )
        .map_err(|_| DecryptError::AuthenticationFailed)?
        .len();
    in_out.truncate(plaintext_len);

    Ok(in_out)
}

fn aead_key(key: &[u8]) -> Option<LessSafeKey> {
    UnboundKey::new(&CHACHA20_POLY1305, key)
        .ok()
        .map(LessSafeKey::new)
}

fn associated_data(aad: &[u8], params: &[u8; KdfParams::ENCODED_LEN]) -> Vec<u8> {
    let mut data = Vec::with_capacity(aad.len() + params.len());
    data.extend_from_slice(aad);
    data.extend_from_slice(params);
    data
}

//! Password-based authenticated encryption of address book payloads
//!
//! The envelope is agnostic of what it protects: the store hands it the
//! encoded payload plus the container header as associated data, and gets
//! back opaque sealed bytes.

mod envelope;
mod kdf;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use envelope::{
    DecryptError, EnvelopeError, MAX_PASSWORD_BYTES, NONCE_LEN, SALT_LEN, TAG_LEN, open, seal,
};
pub use kdf::{KEY_LEN, KdfParams, derive_key};

/// Encryption applied to an address book file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncryptionMode {
    /// Payload stored unencrypted
    #[default]
    None,
    /// Argon2id key derivation with ChaCha20-Poly1305
    #[serde(rename = "chacha20_poly1305")]
    ChaCha20Poly1305,
}

impl EncryptionMode {
    /// Returns the tag written to the container header
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::None => 0,
            Self::ChaCha20Poly1305 => 1,
        }
    }

    /// Looks up a mode by its container header tag
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::None),
            1 => Some(Self::ChaCha20Poly1305),
            _ => None,
        }
    }

    /// Returns true if the mode requires a password
    #[must_use]
    pub const fn is_encrypted(self) -> bool {
        matches!(self, Self::ChaCha20Poly1305)
    }

    /// Returns the identifier used in settings and on the command line
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ChaCha20Poly1305 => "chacha20_poly1305",
        }
    }
}

impl fmt::Display for EncryptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "Without Encryption"),
            Self::ChaCha20Poly1305 => write!(f, "ChaCha20 + Poly1305 (256-bit key)"),
        }
    }
}

impl FromStr for EncryptionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "none" | "plain" => Ok(Self::None),
            "chacha20_poly1305" | "chacha20poly1305" | "chacha" => Ok(Self::ChaCha20Poly1305),
            other => Err(format!("unknown encryption mode: {other}")),
        }
    }
}

//! File container header.
//!
//! ```text
//! [b"AABK"][container version u8][encryption tag u8][sealed payload]
//! ```
//!
//! The header is readable without a password and doubles as the AEAD
//! associated data, so changing the version or the tag of an encrypted
//! file fails authentication.

use crate::crypto::EncryptionMode;
use crate::error::{OpenError, OpenResult};

/// File magic
pub const MAGIC: &[u8; 4] = b"AABK";
/// Current container version
pub const CONTAINER_VERSION: u8 = 1;
/// Header length in bytes
pub const HEADER_LEN: usize = 6;

/// Parsed container header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Encryption applied to the payload
    pub encryption: EncryptionMode,
}

impl ContainerHeader {
    /// Creates a header for the given mode
    #[must_use]
    pub const fn new(encryption: EncryptionMode) -> Self {
        Self { encryption }
    }

    /// Encodes the header
    #[must_use]
    pub fn to_bytes(self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[..4].copy_from_slice(MAGIC);
        out[4] = CONTAINER_VERSION;
        out[5] = self.encryption.tag();
        out
    }

    /// Splits file contents into header and sealed payload
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOrCorrupted` for a short file, wrong magic or an
    /// unknown container version, and `UnsupportedEncryption` for an
    /// unknown encryption tag.
    pub fn parse(data: &[u8]) -> OpenResult<(Self, &[u8])> {
        if data.len() < HEADER_LEN || &data[..4] != MAGIC {
            return Err(OpenError::UnsupportedOrCorrupted(
                "not an address book file".to_string(),
            ));
        }
        if data[4] != CONTAINER_VERSION {
            return Err(OpenError::UnsupportedOrCorrupted(format!(
                "unsupported container version {}",
                data[4]
            )));
        }
        let encryption =
            EncryptionMode::from_tag(data[5]).ok_or(OpenError::UnsupportedEncryption(data[5]))?;
        Ok((Self { encryption }, &data[HEADER_LEN..]))
    }
}

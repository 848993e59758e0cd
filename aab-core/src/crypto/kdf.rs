//! Argon2id key derivation.

use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::trace_operation_debug;
use crate::tracing::span_names;

/// Length of the derived key in bytes
pub const KEY_LEN: usize = 32;

/// Upper bound on memory cost accepted from a file (1 GiB)
const MAX_MEMORY_KIB: u32 = 1024 * 1024;
/// Upper bound on iterations accepted from a file
const MAX_ITERATIONS: u32 = 64;
/// Upper bound on lanes accepted from a file
const MAX_PARALLELISM: u32 = 64;

/// Argon2id cost parameters
///
/// Stored in every encrypted file so a book stays readable when the
/// defaults change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    /// Creates a parameter set
    #[must_use]
    pub const fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        Self {
            memory_kib,
            iterations,
            parallelism,
        }
    }

    /// Serialized size in bytes
    pub const ENCODED_LEN: usize = 12;

    /// Encodes as three little-endian `u32` values
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::ENCODED_LEN] {
        let mut out = [0u8; Self::ENCODED_LEN];
        out[0..4].copy_from_slice(&self.memory_kib.to_le_bytes());
        out[4..8].copy_from_slice(&self.iterations.to_le_bytes());
        out[8..12].copy_from_slice(&self.parallelism.to_le_bytes());
        out
    }

    /// Decodes the form written by [`Self::to_bytes`]
    #[must_use]
    pub fn from_bytes(bytes: &[u8; Self::ENCODED_LEN]) -> Self {
        let word =
            |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        Self {
            memory_kib: word(0),
            iterations: word(4),
            parallelism: word(8),
        }
    }

    /// Checks the parameters against the accepted bounds
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated bound.
    pub fn validate(&self) -> Result<(), String> {
        if self.parallelism == 0 || self.parallelism > MAX_PARALLELISM {
            return Err(format!(
                "parallelism {} is outside 1..={MAX_PARALLELISM}",
                self.parallelism
            ));
        }
        if self.iterations == 0 || self.iterations > MAX_ITERATIONS {
            return Err(format!(
                "iterations {} is outside 1..={MAX_ITERATIONS}",
                self.iterations
            ));
        }
        let min_memory = 8 * self.parallelism;
        if self.memory_kib < min_memory || self.memory_kib > MAX_MEMORY_KIB {
            return Err(format!(
                "memory {} KiB is outside {min_memory}..={MAX_MEMORY_KIB}",
                self.memory_kib
            ));
        }
        Ok(())
    }
}

/// Derives a 256-bit key from a password using Argon2id
///
/// # Errors
///
/// Returns an error if the parameters are out of bounds or Argon2 rejects
/// the inputs.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>, String> {
    let _span = trace_operation_debug!(
        span_names::CRYPTO_DERIVE_KEY,
        memory_kib = params.memory_kib,
        iterations = params.iterations
    )
    .entered();

    params.validate()?;

    let argon2_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| format!("Invalid Argon2 params: {e}"))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password, salt, &mut key[..])
        .map_err(|e| format!("Key derivation failed: {e}"))?;

    Ok(key)
}

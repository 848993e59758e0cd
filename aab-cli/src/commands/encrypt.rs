//! Change encryption type or password.

use std::path::Path;

use aab_core::EncryptionMode;

use super::Context;
use crate::error::CliError;
use crate::util::{new_password, open_book};

/// Encrypt command handler
///
/// Newly sealed files use the configured key derivation cost.
pub fn cmd_encrypt(
    ctx: &Context<'_>,
    file: &Path,
    encryption: EncryptionMode,
    given_password: Option<&str>,
) -> Result<(), CliError> {
    let mut book = open_book(file, ctx.password)?;

    let password = if encryption.is_encrypted() {
        book.set_kdf_params(ctx.settings.security.kdf)?;
        Some(new_password(given_password, ctx.quiet)?)
    } else {
        None
    };
    book.set_encryption(encryption, password)?;
    book.save()?;

    tracing::info!(encryption = encryption.as_str(), "Encryption changed");
    ctx.status(format!("Encryption of '{}' set to {encryption}", file.display()));
    Ok(())
}

//! Create a new address book.

use std::path::Path;

use aab_core::EncryptionMode;
use aab_core::models::{BookProperties, DEFAULT_BOOK_NAME};
use aab_core::store::AddressBook;

use super::Context;
use crate::error::CliError;
use crate::util::new_password;

/// Parameters for `aab new`
pub struct NewParams<'a> {
    pub name: Option<&'a str>,
    pub comment: &'a str,
    pub encryption: Option<EncryptionMode>,
    pub force: bool,
}

/// New book command handler
pub fn cmd_new(ctx: &Context<'_>, file: &Path, params: NewParams<'_>) -> Result<(), CliError> {
    if file.exists() && !params.force {
        return Err(CliError::AlreadyExists(file.display().to_string()));
    }

    let name = params.name.map_or_else(
        || {
            file.file_stem().map_or_else(
                || DEFAULT_BOOK_NAME.to_string(),
                |s| s.to_string_lossy().into_owned(),
            )
        },
        str::to_string,
    );

    let mut book = AddressBook::new(BookProperties::new(name).with_comment(params.comment))?;

    let encryption = params
        .encryption
        .unwrap_or(ctx.settings.security.default_encryption);
    if encryption.is_encrypted() {
        let password = new_password(ctx.password, ctx.quiet)?;
        book.set_kdf_params(ctx.settings.security.kdf)?;
        book.set_encryption(encryption, Some(password))?;
    }

    book.save_to(file)?;
    ctx.status(format!(
        "Created address book '{}' ({encryption})",
        file.display()
    ));
    Ok(())
}

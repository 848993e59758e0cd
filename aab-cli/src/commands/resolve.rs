//! Resolve the effective connection parameters of a computer.

use std::path::Path;

use aab_core::resolver::{ResolvedConnection, resolve};
use secrecy::ExposeSecret;
use serde_json::json;

use super::{Context, print_json};
use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::util::{find_computer, mask, open_book};

/// Resolve command handler
///
/// Passwords are never printed; only whether one is set.
pub fn cmd_resolve(
    ctx: &Context<'_>,
    file: &Path,
    computer: &str,
    format: OutputFormat,
) -> Result<(), CliError> {
    let book = open_book(file, ctx.password)?;
    let id = find_computer(book.tree(), computer)?;
    let entry = book
        .tree()
        .computer(id)
        .ok_or_else(|| CliError::ComputerNotFound(computer.to_string()))?;

    let resolved = resolve(entry, book.properties().router.as_ref())?;
    match format {
        OutputFormat::Table => print!("{}", format_resolved(&resolved)),
        OutputFormat::Json => print_json(&resolved_json(&resolved))?,
    }
    Ok(())
}

/// Formats a resolved connection for the terminal
#[must_use]
pub fn format_resolved(resolved: &ResolvedConnection) -> String {
    match resolved {
        ResolvedConnection::Direct {
            address,
            username,
            password,
        } => format!(
            "Connection:   direct\nAddress:      {address}\nUser:         {username}\nPassword:     {}\n",
            mask(password.expose_secret())
        ),
        ResolvedConnection::Router {
            host_id,
            username,
            password,
            router,
        } => format!(
            "Connection:   router\nHost ID:      {host_id}\nUser:         {username}\nPassword:     {}\n\
             Router:       {}\nRouter user:  {}\nRouter pass:  {}\n",
            mask(password.expose_secret()),
            router.address,
            router.username,
            mask(router.password.expose_secret())
        ),
    }
}

fn resolved_json(resolved: &ResolvedConnection) -> serde_json::Value {
    match resolved {
        ResolvedConnection::Direct {
            address,
            username,
            password,
        } => json!({
            "connection": "direct",
            "address": address,
            "username": username,
            "has_password": !password.expose_secret().is_empty(),
        }),
        ResolvedConnection::Router {
            host_id,
            username,
            password,
            router,
        } => json!({
            "connection": "router",
            "host_id": host_id,
            "username": username,
            "has_password": !password.expose_secret().is_empty(),
            "router": {
                "address": router.address,
                "username": router.username,
            },
        }),
    }
}

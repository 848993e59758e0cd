//! Book-level default router commands.

use std::path::Path;

use aab_core::models::RouterConfig;
use aab_core::validation::{DEFAULT_ROUTER_PORT, HostAddress};
use secrecy::ExposeSecret;
use serde_json::json;

use super::{Context, print_json};
use crate::cli::{OutputFormat, RouterCommands};
use crate::error::CliError;
use crate::util::{mask, open_book, prompt_password};

/// Router command handler
pub fn cmd_router(ctx: &Context<'_>, subcmd: RouterCommands) -> Result<(), CliError> {
    match subcmd {
        RouterCommands::Show { file, format } => cmd_router_show(ctx, &file, format),
        RouterCommands::Set {
            file,
            address,
            user,
            router_password,
        } => cmd_router_set(ctx, &file, &address, &user, router_password),
        RouterCommands::Clear { file } => cmd_router_clear(ctx, &file),
    }
}

fn cmd_router_show(ctx: &Context<'_>, file: &Path, format: OutputFormat) -> Result<(), CliError> {
    let book = open_book(file, ctx.password)?;
    let router = book.properties().router.as_ref();
    match (format, router) {
        (OutputFormat::Table, None) => println!("No router configured."),
        (OutputFormat::Table, Some(router)) => {
            println!("Address:   {}", router.address);
            println!("User:      {}", router.username);
            println!("Password:  {}", mask(router.password.expose_secret()));
        }
        (OutputFormat::Json, router) => print_json(&json!(router.map(|r| json!({
            "address": r.address,
            "username": r.username,
            "has_password": !r.password.expose_secret().is_empty(),
        }))))?,
    }
    Ok(())
}

fn cmd_router_set(
    ctx: &Context<'_>,
    file: &Path,
    address: &str,
    user: &str,
    password: Option<String>,
) -> Result<(), CliError> {
    HostAddress::parse_with_default_port(address, DEFAULT_ROUTER_PORT)?;

    let mut book = open_book(file, ctx.password)?;
    let password = match password {
        Some(password) => password,
        None => prompt_password("Router password: ")?.expose_secret().to_string(),
    };

    let mut properties = book.properties().clone();
    properties.router = Some(RouterConfig::new(address, user, password));
    book.set_properties(properties)?;
    book.save()?;

    ctx.status(format!("Router set to {address}"));
    Ok(())
}

fn cmd_router_clear(ctx: &Context<'_>, file: &Path) -> Result<(), CliError> {
    let mut book = open_book(file, ctx.password)?;
    if book.properties().router.is_none() {
        ctx.status("No router configured.");
        return Ok(());
    }

    let mut properties = book.properties().clone();
    properties.router = None;
    book.set_properties(properties)?;
    book.save()?;

    ctx.status("Router removed");
    Ok(())
}

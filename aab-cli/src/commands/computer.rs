//! Computer management commands.

use std::path::Path;

use aab_core::confirm::Prompt;
use aab_core::models::{Computer, is_router_id};
use aab_core::validation::HostAddress;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use super::{Context, print_json};
use crate::cli::{ComputerCommands, ComputerFields, OutputFormat};
use crate::error::CliError;
use crate::util::{confirm_or_cancel, confirmation, find_computer, find_group, mask, open_book};

/// Computer command handler
pub fn cmd_computer(ctx: &Context<'_>, subcmd: ComputerCommands) -> Result<(), CliError> {
    match subcmd {
        ComputerCommands::Add {
            file,
            name,
            group,
            fields,
        } => cmd_computer_add(ctx, &file, &name, group.as_deref(), fields),
        ComputerCommands::Show {
            file,
            computer,
            format,
        } => cmd_computer_show(ctx, &file, &computer, format),
        ComputerCommands::Update {
            file,
            computer,
            name,
            fields,
        } => cmd_computer_update(ctx, &file, &computer, name, fields),
        ComputerCommands::Delete { file, computer } => cmd_computer_delete(ctx, &file, &computer),
        ComputerCommands::Move {
            file,
            computer,
            group,
        } => cmd_computer_move(ctx, &file, &computer, &group),
        ComputerCommands::Copy { file, computer } => cmd_computer_copy(ctx, &file, &computer),
    }
}

/// Host IDs are taken as is; anything else must parse as `host[:port]`
fn check_address(address: &str) -> Result<(), CliError> {
    if !is_router_id(address) {
        HostAddress::parse(address)?;
    }
    Ok(())
}

/// Applies the given fields, leaving the others unchanged
fn apply_fields(computer: &mut Computer, fields: ComputerFields) -> Result<(), CliError> {
    if let Some(address) = fields.address {
        check_address(&address)?;
        computer.connection.address_or_id = address;
    }
    if let Some(user) = fields.user {
        computer.connection.username = user;
    }
    if let Some(password) = fields.computer_password {
        computer.connection.password = SecretString::from(password);
    }
    if let Some(session) = fields.session {
        computer.session_type = session;
        computer.desktop = computer.desktop.normalized(session);
    }
    if let Some(comment) = fields.comment {
        computer.comment = comment;
    }
    Ok(())
}

fn cmd_computer_add(
    ctx: &Context<'_>,
    file: &Path,
    name: &str,
    group: Option<&str>,
    fields: ComputerFields,
) -> Result<(), CliError> {
    let address = fields.address.clone().unwrap_or_default();
    check_address(&address)?;

    let mut book = open_book(file, ctx.password)?;
    let group = find_group(book.tree(), group.unwrap_or_default())?;
    let mut computer = Computer::new(name, address);
    apply_fields(&mut computer, fields)?;
    let id = book.add_computer(group, computer)?;
    book.save()?;

    let path = book.tree().computer_path(id).unwrap_or_default();
    ctx.status(format!("Added computer '{path}' (ID: {id})"));
    Ok(())
}

fn cmd_computer_show(
    ctx: &Context<'_>,
    file: &Path,
    computer: &str,
    format: OutputFormat,
) -> Result<(), CliError> {
    let book = open_book(file, ctx.password)?;
    let id = find_computer(book.tree(), computer)?;
    let computer = book
        .tree()
        .computer(id)
        .ok_or_else(|| CliError::ComputerNotFound(id.to_string()))?;
    let path = book.tree().computer_path(id).unwrap_or_default();

    match format {
        OutputFormat::Table => print_computer(&path, computer),
        OutputFormat::Json => print_json(&computer_json(&path, computer))?,
    }
    Ok(())
}

fn print_computer(path: &str, computer: &Computer) {
    let connection = &computer.connection;
    println!("Path:         {path}");
    println!("ID:           {}", computer.id);
    println!("Name:         {}", computer.name);
    if !computer.comment.is_empty() {
        println!("Comment:      {}", computer.comment);
    }
    let kind = if connection.is_router_id() { "Host ID" } else { "Address" };
    println!("{kind:<13} {}", connection.address_or_id);
    println!("User:         {}", connection.username);
    println!("Password:     {}", mask(connection.expose_password()));
    if let Some(router) = &connection.router {
        println!("Router:       {} ({})", router.address, router.username);
    }
    println!("Session:      {}", computer.session_type);
    if computer.session_type.is_desktop() {
        let desktop = &computer.desktop;
        println!("Video:        {:?}", desktop.video_encoding);
        println!("Audio:        {}", if desktop.audio { "on" } else { "off" });
    }
    println!("Created:      {}", computer.created_at.to_rfc3339());
    println!("Modified:     {}", computer.modified_at.to_rfc3339());
}

fn computer_json(path: &str, computer: &Computer) -> serde_json::Value {
    let connection = &computer.connection;
    json!({
        "id": computer.id.to_string(),
        "path": path,
        "name": computer.name,
        "comment": computer.comment,
        "address": connection.address_or_id,
        "username": connection.username,
        "has_password": !connection.password.expose_secret().is_empty(),
        "router": connection.router.as_ref().map(|r| json!({
            "address": r.address,
            "username": r.username,
        })),
        "session_type": computer.session_type.as_str(),
        "desktop": computer.desktop,
        "created_at": computer.created_at.to_rfc3339(),
        "modified_at": computer.modified_at.to_rfc3339(),
    })
}

fn cmd_computer_update(
    ctx: &Context<'_>,
    file: &Path,
    computer: &str,
    name: Option<String>,
    fields: ComputerFields,
) -> Result<(), CliError> {
    let mut book = open_book(file, ctx.password)?;
    let id = find_computer(book.tree(), computer)?;
    let mut updated = book
        .tree()
        .computer(id)
        .cloned()
        .ok_or_else(|| CliError::ComputerNotFound(computer.to_string()))?;
    if let Some(name) = name {
        updated.name = name;
    }
    apply_fields(&mut updated, fields)?;
    book.update_computer(id, updated)?;
    book.save()?;

    let path = book.tree().computer_path(id).unwrap_or_default();
    ctx.status(format!("Updated computer '{path}'"));
    Ok(())
}

fn cmd_computer_delete(ctx: &Context<'_>, file: &Path, computer: &str) -> Result<(), CliError> {
    let mut book = open_book(file, ctx.password)?;
    let id = find_computer(book.tree(), computer)?;
    let name = book
        .tree()
        .computer(id)
        .map(|c| c.name.clone())
        .unwrap_or_default();
    confirm_or_cancel(
        confirmation(ctx.yes).as_ref(),
        &Prompt::DeleteComputer { name: &name },
    )?;

    book.delete_computer(id)?;
    book.save()?;

    ctx.status(format!("Deleted computer '{computer}' (ID: {id})"));
    Ok(())
}

fn cmd_computer_move(
    ctx: &Context<'_>,
    file: &Path,
    computer: &str,
    group: &str,
) -> Result<(), CliError> {
    let mut book = open_book(file, ctx.password)?;
    let id = find_computer(book.tree(), computer)?;
    let group = find_group(book.tree(), group)?;
    book.move_computer(id, group)?;
    book.save()?;

    let path = book.tree().computer_path(id).unwrap_or_default();
    ctx.status(format!("Moved computer to '{path}'"));
    Ok(())
}

fn cmd_computer_copy(ctx: &Context<'_>, file: &Path, computer: &str) -> Result<(), CliError> {
    let mut book = open_book(file, ctx.password)?;
    let id = find_computer(book.tree(), computer)?;
    let copy = book.copy_computer(id)?;
    book.save()?;

    let path = book.tree().computer_path(copy).unwrap_or_default();
    ctx.status(format!("Copied computer to '{path}' (ID: {copy})"));
    Ok(())
}

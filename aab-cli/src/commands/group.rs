//! Group management commands.

use std::path::Path;

use aab_core::StoreError;
use aab_core::confirm::Prompt;

use super::Context;
use crate::cli::GroupCommands;
use crate::error::CliError;
use crate::util::{confirm_or_cancel, confirmation, find_group, open_book};

/// Group command handler
pub fn cmd_group(ctx: &Context<'_>, subcmd: GroupCommands) -> Result<(), CliError> {
    match subcmd {
        GroupCommands::Add {
            file,
            name,
            parent,
            comment,
        } => cmd_group_add(ctx, &file, &name, parent.as_deref(), &comment),
        GroupCommands::Rename {
            file,
            group,
            name,
            comment,
        } => cmd_group_rename(ctx, &file, &group, &name, comment.as_deref()),
        GroupCommands::Delete { file, group } => cmd_group_delete(ctx, &file, &group),
        GroupCommands::Move {
            file,
            group,
            parent,
        } => cmd_group_move(ctx, &file, &group, &parent),
    }
}

fn cmd_group_add(
    ctx: &Context<'_>,
    file: &Path,
    name: &str,
    parent: Option<&str>,
    comment: &str,
) -> Result<(), CliError> {
    let mut book = open_book(file, ctx.password)?;
    let parent = find_group(book.tree(), parent.unwrap_or_default())?;
    let id = book.add_group(parent, name, comment)?;
    book.save()?;

    let path = book.tree().group_path(id).unwrap_or_default();
    ctx.status(format!("Added group '{path}' (ID: {id})"));
    Ok(())
}

fn cmd_group_rename(
    ctx: &Context<'_>,
    file: &Path,
    group: &str,
    name: &str,
    comment: Option<&str>,
) -> Result<(), CliError> {
    let mut book = open_book(file, ctx.password)?;
    let id = find_group(book.tree(), group)?;
    let comment = match comment {
        Some(comment) => comment.to_string(),
        None => book
            .tree()
            .group(id)
            .map(|g| g.comment.clone())
            .unwrap_or_default(),
    };
    book.update_group(id, name, &comment)?;
    book.save()?;

    ctx.status(format!("Renamed group '{group}' to '{name}'"));
    Ok(())
}

fn cmd_group_delete(ctx: &Context<'_>, file: &Path, group: &str) -> Result<(), CliError> {
    let mut book = open_book(file, ctx.password)?;
    let id = find_group(book.tree(), group)?;
    if id == book.tree().root_id() {
        return Err(StoreError::CannotDeleteRoot.into());
    }

    let stats = book.tree().subtree_stats(id)?;
    let name = book
        .tree()
        .group(id)
        .map(|g| g.name.clone())
        .unwrap_or_default();
    confirm_or_cancel(
        confirmation(ctx.yes).as_ref(),
        &Prompt::DeleteGroup { name: &name, stats },
    )?;

    book.delete_group(id)?;
    book.save()?;

    ctx.status(format!(
        "Deleted group '{group}' with {} child group(s) and {} computer(s)",
        stats.groups, stats.computers
    ));
    Ok(())
}

fn cmd_group_move(
    ctx: &Context<'_>,
    file: &Path,
    group: &str,
    parent: &str,
) -> Result<(), CliError> {
    let mut book = open_book(file, ctx.password)?;
    let id = find_group(book.tree(), group)?;
    let new_parent = find_group(book.tree(), parent)?;
    book.move_group(id, new_parent)?;
    book.save()?;

    let path = book.tree().group_path(id).unwrap_or_default();
    ctx.status(format!("Moved group to '{path}'"));
    Ok(())
}

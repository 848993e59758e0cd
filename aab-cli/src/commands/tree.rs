//! Print the group tree.

use std::path::Path;

use aab_core::store::{AddressBook, TreeNode, WalkEntry};
use serde_json::json;

use super::{Context, print_json};
use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::util::open_book;

/// Tree command handler
pub fn cmd_tree(ctx: &Context<'_>, file: &Path, format: OutputFormat) -> Result<(), CliError> {
    let book = open_book(file, ctx.password)?;
    let entries = book.tree().walk();
    match format {
        OutputFormat::Table => print!("{}", format_tree(&book, &entries)),
        OutputFormat::Json => print_json(&tree_json(&entries))?,
    }
    Ok(())
}

/// Formats walk entries as an indented listing
///
/// The root line carries the book name; groups end with `/`.
#[must_use]
pub fn format_tree(book: &AddressBook, entries: &[WalkEntry<'_>]) -> String {
    let mut output = String::new();
    for entry in entries {
        let indent = "  ".repeat(entry.depth);
        let line = match entry.node {
            TreeNode::Group(group) if group.is_root() => format!("{}\n", book.properties().name),
            TreeNode::Group(group) => format!("{indent}{}/\n", group.name),
            TreeNode::Computer(computer) => format!(
                "{indent}{}  [{}]\n",
                computer.name, computer.connection.address_or_id
            ),
        };
        output.push_str(&line);
    }
    output
}

fn tree_json(entries: &[WalkEntry<'_>]) -> serde_json::Value {
    let items: Vec<serde_json::Value> = entries
        .iter()
        .map(|entry| match entry.node {
            TreeNode::Group(group) => json!({
                "type": "group",
                "depth": entry.depth,
                "id": group.id.to_string(),
                "parent": group.parent.map(|p| p.to_string()),
                "name": group.name,
                "comment": group.comment,
            }),
            TreeNode::Computer(computer) => json!({
                "type": "computer",
                "depth": entry.depth,
                "id": computer.id.to_string(),
                "group": computer.group.to_string(),
                "name": computer.name,
                "address": computer.connection.address_or_id,
                "session_type": computer.session_type.as_str(),
            }),
        })
        .collect();
    serde_json::Value::Array(items)
}

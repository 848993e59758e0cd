//! Show book properties.

use std::path::Path;

use aab_core::store::AddressBook;
use serde_json::json;

use super::{Context, print_json};
use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::util::open_book;

/// Info command handler
pub fn cmd_info(ctx: &Context<'_>, file: &Path, format: OutputFormat) -> Result<(), CliError> {
    let book = open_book(file, ctx.password)?;
    match format {
        OutputFormat::Table => print_info_table(file, &book),
        OutputFormat::Json => print_json(&info_json(file, &book))?,
    }
    Ok(())
}

fn print_info_table(file: &Path, book: &AddressBook) {
    let properties = book.properties();
    let tree = book.tree();

    println!("File:        {}", file.display());
    println!("Name:        {}", properties.name);
    if !properties.comment.is_empty() {
        println!("Comment:     {}", properties.comment);
    }
    println!("Encryption:  {}", book.encryption());
    if book.encryption().is_encrypted() {
        let kdf = book.kdf_params();
        println!(
            "Key derivation: Argon2id, {} KiB, {} pass(es), {} lane(s)",
            kdf.memory_kib, kdf.iterations, kdf.parallelism
        );
    }
    // The root group is implicit
    println!("Groups:      {}", tree.group_count() - 1);
    println!("Computers:   {}", tree.computer_count());
    match &properties.router {
        Some(router) => println!("Router:      {} ({})", router.address, router.username),
        None => println!("Router:      not configured"),
    }
}

fn info_json(file: &Path, book: &AddressBook) -> serde_json::Value {
    let properties = book.properties();
    let tree = book.tree();
    let kdf = book
        .encryption()
        .is_encrypted()
        .then(|| book.kdf_params());

    json!({
        "file": file.display().to_string(),
        "name": properties.name,
        "comment": properties.comment,
        "encryption": book.encryption().as_str(),
        "kdf": kdf,
        "groups": tree.group_count() - 1,
        "computers": tree.computer_count(),
        "router": properties.router.as_ref().map(|r| json!({
            "address": r.address,
            "username": r.username,
        })),
    })
}

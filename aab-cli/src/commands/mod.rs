//! Command handler modules for the CLI.

mod completions;
mod computer;
mod config;
mod encrypt;
mod group;
mod info;
mod manpage;
mod new;
mod resolve;
mod router;
mod tree;

use std::path::Path;

use aab_core::config::AppSettings;

use crate::cli::Commands;
use crate::error::CliError;

/// Options shared by every command
pub struct Context<'a> {
    /// Custom configuration directory
    pub config_path: Option<&'a Path>,
    /// Loaded application settings
    pub settings: AppSettings,
    /// Password of the book file, if given on the command line
    pub password: Option<&'a str>,
    /// Skip confirmations
    pub yes: bool,
    /// Suppress informational output
    pub quiet: bool,
}

impl Context<'_> {
    /// Prints a status line unless `--quiet` was given
    pub fn status(&self, message: impl std::fmt::Display) {
        if !self.quiet {
            println!("{message}");
        }
    }
}

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(ctx: &Context<'_>, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::New {
            file,
            name,
            comment,
            encryption,
            force,
        } => new::cmd_new(
            ctx,
            &file,
            new::NewParams {
                name: name.as_deref(),
                comment: &comment,
                encryption,
                force,
            },
        ),
        Commands::Info { file, format } => info::cmd_info(ctx, &file, format),
        Commands::Tree { file, format } => tree::cmd_tree(ctx, &file, format),
        Commands::Group(subcmd) => group::cmd_group(ctx, subcmd),
        Commands::Computer(subcmd) => computer::cmd_computer(ctx, subcmd),
        Commands::Resolve {
            file,
            computer,
            format,
        } => resolve::cmd_resolve(ctx, &file, &computer, format),
        Commands::Encrypt {
            file,
            encryption,
            new_password,
        } => encrypt::cmd_encrypt(ctx, &file, encryption, new_password.as_deref()),
        Commands::Router(subcmd) => router::cmd_router(ctx, subcmd),
        Commands::Config(subcmd) => config::cmd_config(ctx, subcmd),
        Commands::Completions { shell } => completions::cmd_completions(shell),
        Commands::Manpage => manpage::cmd_manpage(),
    }
}

/// Pretty-prints a JSON value on stdout
fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Output(format!("Failed to serialize: {e}")))?;
    println!("{json}");
    Ok(())
}

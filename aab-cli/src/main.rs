//! `aab` - command-line interface for encrypted `.aab` address books
//!
//! Provides commands for creating books, managing groups and computers,
//! resolving connection parameters, changing encryption and configuring the
//! default router.

mod cli;
mod commands;
mod error;
mod util;

use aab_core::tracing::{TracingLevel, init_tracing};
use clap::Parser;
use cli::Cli;
use commands::Context;

fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let settings = match util::load_settings(config_path) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    };

    let mut tracing_config = settings.logging.tracing_config();
    match cli.verbose {
        0 => {}
        1 => tracing_config = tracing_config.with_level(TracingLevel::Info),
        2 => tracing_config = tracing_config.with_level(TracingLevel::Debug),
        _ => tracing_config = tracing_config.with_level(TracingLevel::Trace),
    }
    if let Err(e) = init_tracing(&tracing_config) {
        eprintln!("Warning: logging disabled: {e}");
    }

    let ctx = Context {
        config_path,
        settings,
        password: cli.password.as_deref(),
        yes: cli.yes,
        quiet: cli.quiet,
    };
    let result = commands::dispatch(&ctx, cli.command);

    if let Err(e) = result {
        tracing::debug!(error = ?e, "Command failed");
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

//! Settings commands.

use std::path::PathBuf;
use std::str::FromStr;

use aab_core::SettingsError;
use aab_core::config::AppSettings;

use super::{Context, print_json};
use crate::cli::{ConfigCommands, OutputFormat, SettingKey};
use crate::error::CliError;
use crate::util::create_config_manager;

/// Config command handler
pub fn cmd_config(ctx: &Context<'_>, subcmd: ConfigCommands) -> Result<(), CliError> {
    match subcmd {
        ConfigCommands::Show { format } => cmd_config_show(ctx, format),
        ConfigCommands::Set { key, value } => cmd_config_set(ctx, key, &value),
        ConfigCommands::Reset => cmd_config_reset(ctx),
    }
}

fn cmd_config_show(ctx: &Context<'_>, format: OutputFormat) -> Result<(), CliError> {
    let config_manager = create_config_manager(ctx.config_path)?;
    let path = config_manager.settings_path();
    let settings = &ctx.settings;

    match format {
        OutputFormat::Table => {
            let kdf = settings.security.kdf;
            println!("Settings file:      {}", path.display());
            println!(
                "Default encryption: {}",
                settings.security.default_encryption
            );
            println!("KDF memory:         {} KiB", kdf.memory_kib);
            println!("KDF iterations:     {}", kdf.iterations);
            println!("KDF parallelism:    {}", kdf.parallelism);
            println!("Log level:          {}", settings.logging.level);
            match &settings.logging.file {
                Some(file) => println!("Log file:           {}", file.display()),
                None => println!("Log file:           (stderr)"),
            }
        }
        OutputFormat::Json => {
            let settings = serde_json::to_value(settings)
                .map_err(|e| CliError::Output(format!("Failed to serialize: {e}")))?;
            print_json(&serde_json::json!({
                "path": path.display().to_string(),
                "settings": settings,
            }))?;
        }
    }

    Ok(())
}

fn cmd_config_set(ctx: &Context<'_>, key: SettingKey, value: &str) -> Result<(), CliError> {
    let config_manager = create_config_manager(ctx.config_path)?;

    let mut settings = ctx.settings.clone();
    apply_setting(&mut settings, key, value)?;
    config_manager.save_settings(&settings)?;

    ctx.status(format!("Updated {}", key.field()));
    Ok(())
}

fn cmd_config_reset(ctx: &Context<'_>) -> Result<(), CliError> {
    let config_manager = create_config_manager(ctx.config_path)?;
    config_manager.save_settings(&AppSettings::default())?;

    ctx.status(format!(
        "Restored default settings in '{}'",
        config_manager.settings_path().display()
    ));
    Ok(())
}

/// Parses `value` into the setting named by `key`
///
/// Bounds are checked when the settings are saved.
fn apply_setting(
    settings: &mut AppSettings,
    key: SettingKey,
    value: &str,
) -> Result<(), CliError> {
    let security = &mut settings.security;
    match key {
        SettingKey::DefaultEncryption => security.default_encryption = parse(key, value)?,
        SettingKey::KdfMemory => security.kdf.memory_kib = parse(key, value)?,
        SettingKey::KdfIterations => security.kdf.iterations = parse(key, value)?,
        SettingKey::KdfParallelism => security.kdf.parallelism = parse(key, value)?,
        SettingKey::LogLevel => {
            settings.logging.level = value.parse().map_err(|()| invalid(key, value))?;
        }
        SettingKey::LogFile => {
            settings.logging.file = (!value.is_empty()).then(|| PathBuf::from(value));
        }
    }
    Ok(())
}

fn parse<T: FromStr>(key: SettingKey, value: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| invalid(key, value))
}

fn invalid(key: SettingKey, value: &str) -> CliError {
    CliError::Settings(SettingsError::Invalid {
        field: key.field().to_string(),
        reason: format!("unrecognized value '{value}'"),
    })
}

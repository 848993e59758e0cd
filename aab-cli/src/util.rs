//! Shared utility functions used across command modules.

use std::io::{self, BufRead, Write as _};
use std::path::Path;

use aab_core::config::{AppSettings, ConfigManager};
use aab_core::confirm::{AlwaysConfirm, Confirmation, Prompt};
use aab_core::models::{ComputerId, GroupId};
use aab_core::store::{AddressBook, Tree};
use aab_core::validation::check_password_policy;
use secrecy::{ExposeSecret, SecretString};

use crate::error::CliError;

/// Creates a `ConfigManager` using the optional custom config directory
/// from CLI args.
pub fn create_config_manager(config_path: Option<&Path>) -> Result<ConfigManager, CliError> {
    match config_path {
        Some(path) => Ok(ConfigManager::with_config_dir(path.to_path_buf())),
        None => Ok(ConfigManager::new()?),
    }
}

/// Loads application settings, falling back to defaults when the platform
/// has no configuration directory
pub fn load_settings(config_path: Option<&Path>) -> Result<AppSettings, CliError> {
    match create_config_manager(config_path) {
        Ok(manager) => Ok(manager.load_settings()?),
        Err(CliError::Settings(aab_core::SettingsError::NoConfigDir)) => Ok(AppSettings::default()),
        Err(e) => Err(e),
    }
}

/// Reads a password from the terminal without echo
pub fn prompt_password(prompt: &str) -> Result<SecretString, CliError> {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    rpassword::read_password()
        .map(SecretString::from)
        .map_err(|source| CliError::Input {
            what: "password",
            source,
        })
}

/// Opens a book, prompting for the password if it is encrypted and none
/// was given
pub fn open_book(path: &Path, password: Option<&str>) -> Result<AddressBook, CliError> {
    let encryption = AddressBook::peek_encryption(path)?;
    let password = match (encryption.is_encrypted(), password) {
        (false, _) => None,
        (true, Some(password)) => Some(SecretString::from(password)),
        (true, None) => Some(prompt_password(&format!(
            "Password for '{}': ",
            path.display()
        ))?),
    };
    Ok(AddressBook::open(path, password.as_ref())?)
}

/// Takes a new password from the argument or asks for it twice
///
/// Weak passwords are accepted with a warning on stderr.
pub fn new_password(given: Option<&str>, quiet: bool) -> Result<SecretString, CliError> {
    let password = match given {
        Some(password) => password.to_string(),
        None => {
            let first = prompt_password("New password: ")?;
            let second = prompt_password("Confirm password: ")?;
            if first.expose_secret() != second.expose_secret() {
                return Err(CliError::PasswordMismatch);
            }
            first.expose_secret().to_string()
        }
    };

    let strength = check_password_policy(&password);
    if !strength.is_strong() && !quiet {
        eprintln!("Warning: {}", strength.hint());
    }
    Ok(SecretString::from(password))
}

/// Finds a group by slash-separated path; "" and "/" name the root
pub fn find_group(tree: &Tree, path: &str) -> Result<GroupId, CliError> {
    tree.find_group_by_path(path)
        .ok_or_else(|| CliError::GroupNotFound(path.to_string()))
}

/// Finds a computer by UUID or by "Group/Sub/Name" path
pub fn find_computer(tree: &Tree, path_or_id: &str) -> Result<ComputerId, CliError> {
    if let Ok(uuid) = uuid::Uuid::parse_str(path_or_id) {
        let id = ComputerId::from_uuid(uuid);
        if tree.computer(id).is_some() {
            return Ok(id);
        }
    }

    let (group_path, name) = path_or_id.rsplit_once('/').unwrap_or(("", path_or_id));
    let not_found = || CliError::ComputerNotFound(path_or_id.to_string());
    let group = tree.find_group_by_path(group_path).ok_or_else(not_found)?;
    let matches: Vec<ComputerId> = tree
        .computers_in(group)?
        .into_iter()
        .filter(|c| c.name == name)
        .map(|c| c.id)
        .collect();

    match matches.as_slice() {
        [] => Err(not_found()),
        [id] => Ok(*id),
        _ => Err(CliError::Ambiguous {
            name: path_or_id.to_string(),
            matches: matches.iter().map(ToString::to_string).collect(),
        }),
    }
}

/// Asks on the terminal; anything but "y" or "yes" declines
pub struct TerminalConfirm;

impl Confirmation for TerminalConfirm {
    fn confirm(&self, prompt: &Prompt<'_>) -> bool {
        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// Confirmation source for `--yes` or an interactive terminal
pub fn confirmation(yes: bool) -> Box<dyn Confirmation> {
    if yes {
        Box::new(AlwaysConfirm)
    } else {
        Box::new(TerminalConfirm)
    }
}

/// Asks for confirmation, failing with `Cancelled` when declined
pub fn confirm_or_cancel(confirm: &dyn Confirmation, prompt: &Prompt<'_>) -> Result<(), CliError> {
    if confirm.confirm(prompt) {
        Ok(())
    } else {
        Err(CliError::Cancelled)
    }
}

/// Masks a secret for display
pub fn mask(secret: &str) -> &'static str {
    if secret.is_empty() { "" } else { "********" }
}

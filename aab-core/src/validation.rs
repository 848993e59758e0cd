//! Input validation for names, comments, user names, passwords and addresses
//!
//! The store calls the name and comment validators before committing any
//! mutation. The password policy is advisory: front ends decide whether to
//! insist on a strong password, the envelope only enforces
//! [`MAX_PASSWORD_BYTES`](crate::crypto::MAX_PASSWORD_BYTES).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::crypto::MAX_PASSWORD_BYTES;
use crate::error::ValidationError;

/// Maximum length of a group, computer or book name in characters
pub const MAX_NAME_LENGTH: usize = 64;
/// Maximum length of a comment in characters
pub const MAX_COMMENT_LENGTH: usize = 2048;
/// Maximum length of a user name in characters
pub const MAX_USERNAME_LENGTH: usize = 64;
/// Minimum length of a strong password in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;
/// Maximum length of a strong password in characters
pub const MAX_PASSWORD_LENGTH: usize = 64;

/// Port used for direct connections when none is given
pub const DEFAULT_HOST_PORT: u16 = 8050;
/// Port used for router connections when none is given
pub const DEFAULT_ROUTER_PORT: u16 = 8060;

static USERNAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.\-]*$").expect("USERNAME_REGEX is a valid regex pattern")
});

/// Validates a group, computer or book name
///
/// Names are taken verbatim; surrounding whitespace counts.
///
/// # Errors
///
/// Returns `EmptyName` or `NameTooLong`.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong {
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

/// Validates a comment
///
/// # Errors
///
/// Returns `CommentTooLong` if the comment exceeds [`MAX_COMMENT_LENGTH`].
pub fn validate_comment(comment: &str) -> Result<(), ValidationError> {
    if comment.chars().count() > MAX_COMMENT_LENGTH {
        return Err(ValidationError::CommentTooLong {
            max: MAX_COMMENT_LENGTH,
        });
    }
    Ok(())
}

/// Validates a user name; empty is accepted
///
/// # Errors
///
/// Returns `InvalidUserName` for characters outside `[A-Za-z0-9_.-]` or
/// names longer than [`MAX_USERNAME_LENGTH`].
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.chars().count() > MAX_USERNAME_LENGTH || !USERNAME_REGEX.is_match(username) {
        return Err(ValidationError::InvalidUserName);
    }
    Ok(())
}

/// Validates a password for use with the encryption envelope
///
/// # Errors
///
/// Returns `InvalidPassword` if the password is empty or longer than
/// [`MAX_PASSWORD_BYTES`] bytes.
pub fn validate_encryption_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() || password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::InvalidPassword {
            max: MAX_PASSWORD_BYTES,
        });
    }
    Ok(())
}

/// Result of the advisory password policy check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStrength {
    /// No password entered
    Empty,
    /// Longer than [`MAX_PASSWORD_LENGTH`]
    TooLong,
    /// Too short or missing a lowercase letter, uppercase letter or digit
    Weak,
    /// Meets the policy
    Strong,
}

impl PasswordStrength {
    /// Returns true if the password satisfies the policy
    #[must_use]
    pub const fn is_strong(self) -> bool {
        matches!(self, Self::Strong)
    }

    /// Returns a user-facing hint for the policy
    #[must_use]
    pub const fn hint(self) -> &'static str {
        match self {
            Self::Empty => "Password can not be empty",
            Self::TooLong => "Password is too long",
            Self::Weak => {
                "Password must contain lowercase and uppercase characters and numbers and be at \
                 least 8 characters long"
            }
            Self::Strong => "",
        }
    }
}

/// Checks a password against the console's policy
#[must_use]
pub fn check_password_policy(password: &str) -> PasswordStrength {
    let length = password.chars().count();
    if length == 0 {
        return PasswordStrength::Empty;
    }
    if length > MAX_PASSWORD_LENGTH {
        return PasswordStrength::TooLong;
    }

    let has_lower = password.chars().any(char::is_lowercase);
    let has_upper = password.chars().any(char::is_uppercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if length >= MIN_PASSWORD_LENGTH && has_lower && has_upper && has_digit {
        PasswordStrength::Strong
    } else {
        PasswordStrength::Weak
    }
}

/// A parsed `host[:port]` address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAddress {
    /// Host name or IP address without brackets
    pub host: String,
    /// Port number
    pub port: u16,
}

impl HostAddress {
    /// Parses a direct connection address, defaulting to [`DEFAULT_HOST_PORT`]
    ///
    /// # Errors
    ///
    /// Returns `InvalidAddress` if the address is malformed.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        Self::parse_with_default_port(input, DEFAULT_HOST_PORT)
    }

    /// Parses `host[:port]`, `[ipv6][:port]` or a bare IPv6 address
    ///
    /// # Errors
    ///
    /// Returns `InvalidAddress` if the host is empty, contains whitespace,
    /// has unbalanced brackets, or the port is not in `1..=65535`.
    pub fn parse_with_default_port(
        input: &str,
        default_port: u16,
    ) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidAddress(input.to_string());

        let (host, port) = if let Some(rest) = input.strip_prefix('[') {
            let (host, tail) = rest.split_once(']').ok_or_else(invalid)?;
            let port = match tail {
                "" => None,
                _ => Some(tail.strip_prefix(':').ok_or_else(invalid)?),
            };
            (host, port)
        } else if input.matches(':').count() > 1 {
            // Bare IPv6 literal; a port requires brackets
            (input, None)
        } else {
            match input.split_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (input, None),
            }
        };

        if host.is_empty() || host.chars().any(|c| c.is_whitespace() || c == '[' || c == ']') {
            return Err(invalid());
        }

        let port = match port {
            Some(port) => match port.parse::<u16>() {
                Ok(port) if port != 0 => port,
                _ => return Err(invalid()),
            },
            None => default_port,
        };

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for HostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

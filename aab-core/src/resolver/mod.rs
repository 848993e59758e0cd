//! Connection descriptor resolution
//!
//! Turns a stored [`Computer`] plus the book's default router into the
//! parameters a session needs. Direct addresses pass through untouched;
//! router host IDs get a router assembled field by field, with non-empty
//! computer-level values taking precedence over the book defaults.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::models::{Computer, RouterConfig};
use crate::trace_operation_debug;
use crate::tracing::span_names;
use crate::validation::{DEFAULT_ROUTER_PORT, HostAddress, validate_username};

/// Reasons a computer cannot be connected to as configured
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Connection by ID without a router on the computer or the book
    #[error("Connection by ID is specified but the router is not configured")]
    RouterNotConfigured,

    /// The merged router has no password
    #[error("Router password cannot be empty")]
    RouterPasswordEmpty,

    /// The merged router address is empty or malformed
    #[error("Invalid router address: {0:?}")]
    InvalidRouterAddress(String),

    /// The merged router user name is empty or malformed
    #[error("Invalid router user name")]
    InvalidRouterUserName,

    /// The computer user name is malformed
    #[error("The user name can contain only alphabet characters, numbers and _, -, . characters")]
    InvalidUserName,
}

/// Connection parameters ready for a session
#[derive(Debug, Clone)]
pub enum ResolvedConnection {
    /// Connect to `address` directly
    Direct {
        /// `host[:port]` as stored
        address: String,
        /// User name on the remote computer
        username: String,
        /// Password on the remote computer
        password: SecretString,
    },
    /// Connect to `host_id` through `router`
    Router {
        /// Router-assigned host ID
        host_id: String,
        /// User name on the remote computer
        username: String,
        /// Password on the remote computer
        password: SecretString,
        /// Router with every field resolved
        router: RouterConfig,
    },
}

impl ResolvedConnection {
    /// Returns true for connections through a router
    #[must_use]
    pub const fn is_router(&self) -> bool {
        matches!(self, Self::Router { .. })
    }

    /// Returns the merged router, if any
    #[must_use]
    pub const fn router(&self) -> Option<&RouterConfig> {
        match self {
            Self::Direct { .. } => None,
            Self::Router { router, .. } => Some(router),
        }
    }

    /// Returns the user name on the remote computer
    #[must_use]
    pub fn username(&self) -> &str {
        match self {
            Self::Direct { username, .. } | Self::Router { username, .. } => username,
        }
    }
}

/// Resolves a computer's connection descriptor against the book defaults
///
/// # Errors
///
/// - `InvalidUserName` if the computer user name contains characters
///   outside `[A-Za-z0-9_.-]`
/// - `RouterNotConfigured` for a host ID with no non-blank router on the
///   computer or the book
/// - `RouterPasswordEmpty`, then `InvalidRouterAddress`, then
///   `InvalidRouterUserName` if the merged router is incomplete
pub fn resolve(
    computer: &Computer,
    book_router: Option<&RouterConfig>,
) -> Result<ResolvedConnection, ConfigError> {
    let _span = trace_operation_debug!(
        span_names::RESOLVER_RESOLVE,
        computer_id = %computer.id
    )
    .entered();

    let connection = &computer.connection;
    validate_username(&connection.username).map_err(|_| ConfigError::InvalidUserName)?;

    if !connection.is_router_id() {
        tracing::debug!(username = %connection.username, "Resolved direct connection");
        return Ok(ResolvedConnection::Direct {
            address: connection.address_or_id.clone(),
            username: connection.username.clone(),
            password: connection.password.clone(),
        });
    }

    let router = merge_router(connection.router.as_ref(), book_router)?;
    validate_router(&router)?;

    tracing::debug!(username = %connection.username, "Resolved connection through router");
    Ok(ResolvedConnection::Router {
        host_id: connection.address_or_id.clone(),
        username: connection.username.clone(),
        password: connection.password.clone(),
        router,
    })
}

/// Merges computer-level and book-level routers field by field
///
/// # Errors
///
/// Returns `RouterNotConfigured` if neither router is present. A router
/// with every field empty counts as absent.
pub fn merge_router(
    computer: Option<&RouterConfig>,
    book: Option<&RouterConfig>,
) -> Result<RouterConfig, ConfigError> {
    let computer = computer.filter(|router| !router.is_empty());
    let book = book.filter(|router| !router.is_empty());
    match (computer, book) {
        (None, None) => Err(ConfigError::RouterNotConfigured),
        (Some(only), None) | (None, Some(only)) => Ok(only.clone()),
        (Some(own), Some(fallback)) => {
            Ok(RouterConfig {
                address: pick(&own.address, &fallback.address),
                username: pick(&own.username, &fallback.username),
                password: SecretString::from(pick(
                    own.password.expose_secret(),
                    fallback.password.expose_secret(),
                )),
            })
        }
    }
}

fn pick(own: &str, fallback: &str) -> String {
    let chosen = if own.is_empty() { fallback } else { own };
    chosen.to_string()
}

fn validate_router(router: &RouterConfig) -> Result<(), ConfigError> {
    if router.password.expose_secret().is_empty() {
        return Err(ConfigError::RouterPasswordEmpty);
    }
    HostAddress::parse_with_default_port(&router.address, DEFAULT_ROUTER_PORT)
        .map_err(|_| ConfigError::InvalidRouterAddress(router.address.clone()))?;
    if router.username.is_empty() || validate_username(&router.username).is_err() {
        return Err(ConfigError::InvalidRouterUserName);
    }
    Ok(())
}

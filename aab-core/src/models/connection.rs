//! Connection descriptor persisted with every computer.
//!
//! A computer is reached either directly (`host[:port]`) or through a router
//! by its numeric host ID. In the latter case a [`RouterConfig`] must be
//! resolvable from the computer itself or from the book defaults; see
//! [`crate::resolver`].

use secrecy::{ExposeSecret, SecretString};

/// Router used to reach a computer by ID (NAT bypass)
///
/// Passwords are held as `SecretString` and never appear in `Debug` output.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Router address (`host[:port]`)
    pub address: String,
    /// User name on the router
    pub username: String,
    /// Router password
    pub password: SecretString,
}

impl RouterConfig {
    /// Creates a router configuration
    #[must_use]
    pub fn new(
        address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Returns true if no field carries a value
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.address.is_empty()
            && self.username.is_empty()
            && self.password.expose_secret().is_empty()
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new(String::new(), String::new(), String::new())
    }
}

// Manual PartialEq implementation since SecretString doesn't implement it
impl PartialEq for RouterConfig {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
            && self.username == other.username
            && self.password.expose_secret() == other.password.expose_secret()
    }
}

impl Eq for RouterConfig {}

/// How to reach a computer
#[derive(Debug, Clone)]
pub struct ConnectionDescriptor {
    /// Direct `host[:port]` address or router-assigned numeric ID
    pub address_or_id: String,
    /// User name on the remote computer
    pub username: String,
    /// Password on the remote computer
    pub password: SecretString,
    /// Router override for connections by ID
    pub router: Option<RouterConfig>,
}

impl ConnectionDescriptor {
    /// Creates a descriptor for the given address or host ID
    #[must_use]
    pub fn new(address_or_id: impl Into<String>) -> Self {
        Self {
            address_or_id: address_or_id.into(),
            username: String::new(),
            password: SecretString::from(String::new()),
            router: None,
        }
    }

    /// Returns true if `address_or_id` is a router host ID rather than an address
    #[must_use]
    pub fn is_router_id(&self) -> bool {
        is_router_id(&self.address_or_id)
    }

    /// Exposes the password for use (should be used carefully)
    #[must_use]
    pub fn expose_password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl Default for ConnectionDescriptor {
    fn default() -> Self {
        Self::new(String::new())
    }
}

// Manual PartialEq implementation since SecretString doesn't implement it
impl PartialEq for ConnectionDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.address_or_id == other.address_or_id
            && self.username == other.username
            && self.password.expose_secret() == other.password.expose_secret()
            && self.router == other.router
    }
}

impl Eq for ConnectionDescriptor {}

/// Returns true if `value` is a router-assigned host ID
///
/// Host IDs are non-empty strings of ASCII digits; anything else is treated
/// as a direct address.
#[must_use]
pub fn is_router_id(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

//! Computer model: one remote machine in the address book.

use chrono::{DateTime, SubsecRound, Utc};
use secrecy::SecretString;

use super::{ComputerId, ConnectionDescriptor, DesktopConfig, GroupId, RouterConfig, SessionType};

/// A remote computer entry
///
/// The owning group is assigned by the store when the computer is attached;
/// the value set by callers before `add_computer` is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Computer {
    /// Stable identifier
    pub id: ComputerId,
    /// Display name
    pub name: String,
    /// Free-form comment
    pub comment: String,
    /// Owning group
    pub group: GroupId,
    /// How to reach the computer
    pub connection: ConnectionDescriptor,
    /// Session type launched on connect
    pub session_type: SessionType,
    /// Desktop session preferences
    pub desktop: DesktopConfig,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
}

impl Computer {
    /// Creates a new computer with a fresh id
    #[must_use]
    pub fn new(name: impl Into<String>, address_or_id: impl Into<String>) -> Self {
        let now = now();
        Self {
            id: ComputerId::new(),
            name: name.into(),
            comment: String::new(),
            group: GroupId::from_uuid(uuid::Uuid::nil()),
            connection: ConnectionDescriptor::new(address_or_id),
            session_type: SessionType::default(),
            desktop: DesktopConfig::default(),
            created_at: now,
            modified_at: now,
        }
    }

    /// Sets the comment
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Sets user name and password on the remote computer
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.connection.username = username.into();
        self.connection.password = SecretString::from(password.into());
        self
    }

    /// Sets a computer-level router override
    #[must_use]
    pub fn with_router(mut self, router: RouterConfig) -> Self {
        self.connection.router = Some(router);
        self
    }

    /// Sets the session type
    #[must_use]
    pub const fn with_session_type(mut self, session_type: SessionType) -> Self {
        self.session_type = session_type;
        self
    }

    /// Updates the `modified_at` timestamp to now
    pub fn touch(&mut self) {
        self.modified_at = now();
    }

    /// Clones the computer under a fresh id with fresh timestamps
    #[must_use]
    pub(crate) fn duplicate(&self) -> Self {
        let now = now();
        Self {
            id: ComputerId::new(),
            created_at: now,
            modified_at: now,
            ..self.clone()
        }
    }
}

/// Current time truncated to whole microseconds
///
/// The persisted RFC 3339 form keeps microseconds, so truncating here keeps
/// freshly created entries equal to their decoded copies.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

//! Serialized form of the address book body.
//!
//! The body is flat: groups are listed in pre-order with a parent id and
//! computers are listed per group. Nesting depth of the JSON document is
//! therefore constant no matter how deep the tree is.
//!
//! Secrets are plain strings here; every wire struct that holds one wipes
//! it on drop.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::models::{
    BookProperties, Computer, ComputerId, ConnectionDescriptor, DesktopConfig, Group, GroupId,
    RouterConfig, SessionType,
};

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct WireBook {
    pub properties: WireProperties,
    pub groups: Vec<WireGroup>,
    pub computers: Vec<WireComputer>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct WireProperties {
    pub name: String,
    pub comment: String,
    pub router: Option<WireRouter>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct WireRouter {
    pub address: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct WireGroup {
    pub id: GroupId,
    pub parent: Option<GroupId>,
    pub name: String,
    pub comment: String,
    pub expanded: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct WireComputer {
    pub id: ComputerId,
    pub group: GroupId,
    pub name: String,
    pub comment: String,
    pub address: String,
    pub username: String,
    pub password: String,
    pub router: Option<WireRouter>,
    pub session_type: SessionType,
    pub desktop: DesktopConfig,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Drop for WireRouter {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

impl Drop for WireComputer {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

impl From<&RouterConfig> for WireRouter {
    fn from(router: &RouterConfig) -> Self {
        Self {
            address: router.address.clone(),
            username: router.username.clone(),
            password: router.password.expose_secret().to_string(),
        }
    }
}

impl WireRouter {
    pub fn into_router(mut self) -> RouterConfig {
        RouterConfig {
            address: std::mem::take(&mut self.address),
            username: std::mem::take(&mut self.username),
            password: SecretString::from(std::mem::take(&mut self.password)),
        }
    }
}

impl From<&BookProperties> for WireProperties {
    fn from(properties: &BookProperties) -> Self {
        Self {
            name: properties.name.clone(),
            comment: properties.comment.clone(),
            router: properties.router.as_ref().map(WireRouter::from),
        }
    }
}

impl WireProperties {
    pub fn into_properties(self) -> BookProperties {
        BookProperties {
            name: self.name,
            comment: self.comment,
            router: self.router.map(WireRouter::into_router),
        }
    }
}

impl From<&Group> for WireGroup {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id,
            parent: group.parent,
            name: group.name.clone(),
            comment: group.comment.clone(),
            expanded: group.expanded,
        }
    }
}

impl WireGroup {
    pub fn into_group(self) -> Group {
        let mut group = Group::new(self.id, self.parent, self.name, self.comment);
        group.expanded = self.expanded;
        group
    }
}

impl From<&Computer> for WireComputer {
    fn from(computer: &Computer) -> Self {
        Self {
            id: computer.id,
            group: computer.group,
            name: computer.name.clone(),
            comment: computer.comment.clone(),
            address: computer.connection.address_or_id.clone(),
            username: computer.connection.username.clone(),
            password: computer.connection.expose_password().to_string(),
            router: computer.connection.router.as_ref().map(WireRouter::from),
            session_type: computer.session_type,
            desktop: computer.desktop,
            created_at: computer.created_at,
            modified_at: computer.modified_at,
        }
    }
}

impl WireComputer {
    pub fn into_computer(mut self) -> Computer {
        Computer {
            id: self.id,
            name: std::mem::take(&mut self.name),
            comment: std::mem::take(&mut self.comment),
            group: self.group,
            connection: ConnectionDescriptor {
                address_or_id: std::mem::take(&mut self.address),
                username: std::mem::take(&mut self.username),
                password: SecretString::from(std::mem::take(&mut self.password)),
                router: self.router.take().map(WireRouter::into_router),
            },
            session_type: self.session_type,
            desktop: self.desktop,
            created_at: self.created_at,
            modified_at: self.modified_at,
        }
    }
}

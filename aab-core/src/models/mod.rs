//! Data models for the address book tree.

mod book;
mod computer;
mod connection;
mod group;
mod ids;
mod session;

pub use book::{BookProperties, DEFAULT_BOOK_NAME};
pub use computer::Computer;
pub use connection::{ConnectionDescriptor, RouterConfig, is_router_id};
pub use group::{Group, ROOT_GROUP_NAME};
pub use ids::{ComputerId, GroupId, ItemId};
pub use session::{
    ColorDepth, DEFAULT_COMPRESS_RATIO, DesktopConfig, DesktopFeatures, MAX_COMPRESS_RATIO,
    MIN_COMPRESS_RATIO, SessionType, VideoEncoding,
};

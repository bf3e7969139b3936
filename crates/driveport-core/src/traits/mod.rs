//! Capability traits implemented by infrastructure crates.

pub mod drive;

pub use drive::{
    ByteStream, DriveClient, DriveItem, DriveItemKind, DrivePermission, GrantRecipient, ListQuery,
    PermissionRole,
};

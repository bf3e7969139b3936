//! # driveport-drive
//!
//! Google Drive REST v3 implementation of the [`DriveClient`] capability
//! trait, plus the OAuth access-token source it authenticates with.
//!
//! [`DriveClient`]: driveport_core::traits::drive::DriveClient

pub mod client;
pub mod query;
pub mod token;

pub use client::GoogleDriveClient;
pub use token::{AccessTokenSource, OAuthTokenSource};

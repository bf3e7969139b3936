//! # driveport-service
//!
//! Business logic services for DrivePort: the Drive item service with its
//! auto-share policy and ledger reconciliation, and the user service for
//! registration, login, and member management.

pub mod context;
pub mod item;
pub mod user;

pub use context::RequestContext;

//! # driveport-auth
//!
//! The authorization core of DrivePort: the account hierarchy directory,
//! the per-request visibility resolver, and the access guard that gates
//! every Drive item operation. Also carries the ambient auth stack: JWT
//! encode/decode, Argon2id password hashing, password strength checks,
//! and OTP code helpers.

pub mod hierarchy;
pub mod jwt;
pub mod otp;
pub mod password;
pub mod rbac;
pub mod store;
pub mod visibility;

pub use hierarchy::HierarchyDirectory;
pub use store::{DirectoryStore, LedgerStore};
pub use visibility::guard::AccessGuard;
pub use visibility::resolver::{Visibility, VisibilityResolver};

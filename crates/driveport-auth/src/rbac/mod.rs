//! Role-based rules for member management.

pub mod policy;

pub use policy::{can_create, creatable_roles};

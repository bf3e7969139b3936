//! Account registration, login, and member management.

pub mod service;

pub use service::UserService;

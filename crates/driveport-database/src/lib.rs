//! # driveport-database
//!
//! PostgreSQL connection management and concrete repository
//! implementations for the account directory and the Drive item ledger.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;

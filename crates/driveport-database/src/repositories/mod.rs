//! Concrete repository implementations.

pub mod account;
pub mod ledger;

pub use account::AccountRepository;
pub use ledger::LedgerRepository;

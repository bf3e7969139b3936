//! Drive item operations: listing, mutation, sharing, and the auto-share
//! policy that runs after every upload or folder creation.

pub mod autoshare;
pub mod backfill;
pub mod service;

pub use autoshare::{AutoShareOutcome, AutoSharePolicy, RecipientGrant};
pub use backfill::LedgerReconciler;
pub use service::ItemService;

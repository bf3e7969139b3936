//! Drive item metadata ledger entity.

pub mod model;

pub use model::{DriveItemRecord, UpsertUploader};

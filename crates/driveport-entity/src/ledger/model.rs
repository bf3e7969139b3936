//! Ledger record model: one row per external Drive item id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Local bookkeeping for a single Drive item.
///
/// Drive itself has no notion of "uploader" distinct from the delegated
/// OAuth owner, so this record is the only place the uploading account is
/// known. It is created lazily on first upload or first inference from
/// Drive-reported owner metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveItemRecord {
    /// External Drive item id.
    pub item_id: String,
    /// Uploader's email, lowercased; absent until known.
    pub uploader_email: Option<String>,
    /// Uploader's local account id; absent until resolved.
    pub uploader_account_id: Option<Uuid>,
    /// When auto-share last ran for this item; absent if never.
    pub auto_shared_at: Option<DateTime<Utc>>,
    /// Account ids the item has been explicitly shared with through this
    /// application. Grows only; never pruned by this subsystem.
    pub shared_with: Vec<Uuid>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl DriveItemRecord {
    /// Whether the item was ever auto-shared.
    pub fn is_auto_shared(&self) -> bool {
        self.auto_shared_at.is_some()
    }

    /// Whether the item was explicitly shared with the given account.
    pub fn is_shared_with(&self, account_id: Uuid) -> bool {
        self.shared_with.contains(&account_id)
    }
}

/// Parameters for an uploader upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertUploader {
    /// External Drive item id.
    pub item_id: String,
    /// Uploader's email, lowercased.
    pub uploader_email: Option<String>,
    /// Uploader's local account id.
    pub uploader_account_id: Option<Uuid>,
}

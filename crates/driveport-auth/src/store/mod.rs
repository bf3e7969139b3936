//! Store traits consumed by the authorization core.
//!
//! The visibility resolver, access guard, and auto-share policy depend on
//! these traits rather than on concrete repositories, so the core logic
//! runs unchanged against PostgreSQL in production and against the
//! in-memory implementations in tests.

pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use driveport_core::result::AppResult;
use driveport_database::repositories::{AccountRepository, LedgerRepository};
use driveport_entity::account::{Account, AccountRole};
use driveport_entity::ledger::model::{DriveItemRecord, UpsertUploader};

/// Read access to the account directory and its `created_by` forest.
///
/// Lookups for unknown ids return empty results, never errors.
#[async_trait]
pub trait DirectoryStore: Send + Sync + 'static {
    /// Find an account by id.
    async fn account_by_id(&self, id: Uuid) -> AppResult<Option<Account>>;

    /// Find several accounts by id.
    async fn accounts_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Account>>;

    /// List the accounts created by the given account, optionally
    /// filtered by role.
    async fn accounts_created_by(
        &self,
        creator_id: Uuid,
        role: Option<AccountRole>,
    ) -> AppResult<Vec<Account>>;

    /// Find accounts whose primary or Drive-linked email appears in the
    /// given list.
    async fn accounts_by_emails(&self, emails: &[String]) -> AppResult<Vec<Account>>;
}

/// Read/write access to the Drive item metadata ledger.
///
/// All writes are upserts keyed by item id; share recording has
/// set-union semantics and every operation is idempotent.
#[async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    /// Create or update the uploader fields for an item.
    async fn upsert_uploader(&self, data: &UpsertUploader) -> AppResult<DriveItemRecord>;

    /// Add explicit share recipients for an item (distinct ids only).
    async fn record_share(&self, item_id: &str, recipient_ids: &[Uuid]) -> AppResult<()>;

    /// Stamp the auto-share timestamp for an item.
    async fn mark_auto_shared(&self, item_id: &str) -> AppResult<()>;

    /// Fetch the record for an item, if any.
    async fn get(&self, item_id: &str) -> AppResult<Option<DriveItemRecord>>;

    /// Fetch records for many item ids.
    async fn get_many(&self, item_ids: &[String]) -> AppResult<Vec<DriveItemRecord>>;

    /// Delete the record for an item; absent records are not an error.
    async fn delete(&self, item_id: &str) -> AppResult<bool>;
}

#[async_trait]
impl DirectoryStore for AccountRepository {
    async fn account_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        self.find_by_id(id).await
    }

    async fn accounts_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Account>> {
        self.find_by_ids(ids).await
    }

    async fn accounts_created_by(
        &self,
        creator_id: Uuid,
        role: Option<AccountRole>,
    ) -> AppResult<Vec<Account>> {
        self.find_created_by(creator_id, role).await
    }

    async fn accounts_by_emails(&self, emails: &[String]) -> AppResult<Vec<Account>> {
        self.find_by_emails(emails).await
    }
}

#[async_trait]
impl LedgerStore for LedgerRepository {
    async fn upsert_uploader(&self, data: &UpsertUploader) -> AppResult<DriveItemRecord> {
        LedgerRepository::upsert_uploader(self, data).await
    }

    async fn record_share(&self, item_id: &str, recipient_ids: &[Uuid]) -> AppResult<()> {
        LedgerRepository::record_share(self, item_id, recipient_ids).await
    }

    async fn mark_auto_shared(&self, item_id: &str) -> AppResult<()> {
        LedgerRepository::mark_auto_shared(self, item_id).await
    }

    async fn get(&self, item_id: &str) -> AppResult<Option<DriveItemRecord>> {
        LedgerRepository::get(self, item_id).await
    }

    async fn get_many(&self, item_ids: &[String]) -> AppResult<Vec<DriveItemRecord>> {
        LedgerRepository::get_many(self, item_ids).await
    }

    async fn delete(&self, item_id: &str) -> AppResult<bool> {
        LedgerRepository::delete(self, item_id).await
    }
}

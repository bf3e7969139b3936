//! In-memory store implementations using Tokio locks.
//!
//! Suitable for tests and single-process tooling; the production stores
//! are the PostgreSQL repositories.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use driveport_core::result::AppResult;
use driveport_entity::account::{Account, AccountRole};
use driveport_entity::ledger::model::{DriveItemRecord, UpsertUploader};

use super::{DirectoryStore, LedgerStore};

/// In-memory account directory.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an account.
    pub async fn insert(&self, account: Account) {
        self.accounts.write().await.insert(account.id, account);
    }
}

#[async_trait]
impl DirectoryStore for MemoryDirectory {
    async fn account_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn accounts_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Account>> {
        let accounts = self.accounts.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| accounts.get(id).cloned())
            .collect())
    }

    async fn accounts_created_by(
        &self,
        creator_id: Uuid,
        role: Option<AccountRole>,
    ) -> AppResult<Vec<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .filter(|a| a.created_by == Some(creator_id))
            .filter(|a| role.is_none_or(|r| a.role == r))
            .cloned()
            .collect())
    }

    async fn accounts_by_emails(&self, emails: &[String]) -> AppResult<Vec<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .filter(|a| emails.iter().any(|e| a.matches_email(e)))
            .cloned()
            .collect())
    }
}

/// In-memory Drive item ledger.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: RwLock<HashMap<String, DriveItemRecord>>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn blank_record(item_id: &str) -> DriveItemRecord {
        let now = Utc::now();
        DriveItemRecord {
            item_id: item_id.to_string(),
            uploader_email: None,
            uploader_account_id: None,
            auto_shared_at: None,
            shared_with: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn upsert_uploader(&self, data: &UpsertUploader) -> AppResult<DriveItemRecord> {
        let mut records = self.records.write().await;
        let record = records
            .entry(data.item_id.clone())
            .or_insert_with(|| Self::blank_record(&data.item_id));

        // Preserve an already-known uploader, matching the SQL upsert.
        if record.uploader_email.is_none() {
            record.uploader_email = data.uploader_email.as_ref().map(|e| e.to_lowercase());
        }
        if record.uploader_account_id.is_none() {
            record.uploader_account_id = data.uploader_account_id;
        }
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn record_share(&self, item_id: &str, recipient_ids: &[Uuid]) -> AppResult<()> {
        if recipient_ids.is_empty() {
            return Ok(());
        }
        let mut records = self.records.write().await;
        let record = records
            .entry(item_id.to_string())
            .or_insert_with(|| Self::blank_record(item_id));
        for id in recipient_ids {
            if !record.shared_with.contains(id) {
                record.shared_with.push(*id);
            }
        }
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_auto_shared(&self, item_id: &str) -> AppResult<()> {
        let mut records = self.records.write().await;
        let record = records
            .entry(item_id.to_string())
            .or_insert_with(|| Self::blank_record(item_id));
        record.auto_shared_at = Some(Utc::now());
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn get(&self, item_id: &str) -> AppResult<Option<DriveItemRecord>> {
        Ok(self.records.read().await.get(item_id).cloned())
    }

    async fn get_many(&self, item_ids: &[String]) -> AppResult<Vec<DriveItemRecord>> {
        let records = self.records.read().await;
        Ok(item_ids
            .iter()
            .filter_map(|id| records.get(id).cloned())
            .collect())
    }

    async fn delete(&self, item_id: &str) -> AppResult<bool> {
        Ok(self.records.write().await.remove(item_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_preserves_known_uploader() {
        let ledger = MemoryLedger::new();
        let first = Uuid::new_v4();

        ledger
            .upsert_uploader(&UpsertUploader {
                item_id: "f1".into(),
                uploader_email: Some("A@x.com".into()),
                uploader_account_id: Some(first),
            })
            .await
            .unwrap();

        let record = ledger
            .upsert_uploader(&UpsertUploader {
                item_id: "f1".into(),
                uploader_email: Some("other@x.com".into()),
                uploader_account_id: Some(Uuid::new_v4()),
            })
            .await
            .unwrap();

        assert_eq!(record.uploader_email.as_deref(), Some("a@x.com"));
        assert_eq!(record.uploader_account_id, Some(first));
    }

    #[tokio::test]
    async fn test_record_share_is_set_union() {
        let ledger = MemoryLedger::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        ledger.record_share("f1", &[a]).await.unwrap();
        ledger.record_share("f1", &[a, b]).await.unwrap();

        let record = ledger.get("f1").await.unwrap().unwrap();
        assert_eq!(record.shared_with.len(), 2);
        assert!(record.is_shared_with(a));
        assert!(record.is_shared_with(b));
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_not_an_error() {
        let ledger = MemoryLedger::new();
        assert!(!ledger.delete("missing").await.unwrap());
    }
}

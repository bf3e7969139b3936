//! Ledger reconciliation from Drive-reported owner metadata.
//!
//! Items created before this application existed (or outside it) have no
//! ledger record. When a listing encounters such an item, the uploader is
//! inferred from Drive's owner email and written back, so the metadata
//! heals itself on every list call. The write is an idempotent upsert and
//! strictly best-effort.

use std::sync::Arc;

use driveport_auth::store::LedgerStore;
use driveport_core::result::BestEffort;
use driveport_core::traits::drive::DriveItem;
use driveport_entity::account::Account;
use driveport_entity::ledger::model::{DriveItemRecord, UpsertUploader};

/// Infers uploader identity for unledgered items and backfills the ledger.
#[derive(Clone)]
pub struct LedgerReconciler {
    ledger: Arc<dyn LedgerStore>,
}

impl std::fmt::Debug for LedgerReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerReconciler").finish()
    }
}

impl LedgerReconciler {
    /// Creates a new reconciler.
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self { ledger }
    }

    /// Matches a Drive item's owner emails against candidate accounts.
    ///
    /// Returns the first candidate whose primary or Drive-linked email is
    /// among the item's owners.
    pub fn infer_uploader<'a>(
        item: &DriveItem,
        candidates: &'a [Account],
    ) -> Option<&'a Account> {
        item.owner_emails.iter().find_map(|owner_email| {
            candidates
                .iter()
                .find(|account| account.matches_email(owner_email))
        })
    }

    /// Writes an inferred uploader back to the ledger.
    pub async fn backfill(
        &self,
        item: &DriveItem,
        uploader: &Account,
    ) -> BestEffort<DriveItemRecord> {
        let result = self
            .ledger
            .upsert_uploader(&UpsertUploader {
                item_id: item.id.clone(),
                uploader_email: Some(uploader.sharing_email().to_lowercase()),
                uploader_account_id: Some(uploader.id),
            })
            .await;

        BestEffort::from_result(result, "ledger backfill")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use driveport_auth::store::memory::MemoryLedger;
    use driveport_core::traits::drive::DriveItemKind;
    use driveport_entity::account::AccountRole;
    use uuid::Uuid;

    fn account(email: &str, drive_email: Option<&str>) -> Account {
        Account {
            id: Uuid::new_v4(),
            username: email.split('@').next().unwrap().to_string(),
            email: email.to_string(),
            password_hash: "hash".into(),
            role: AccountRole::Client,
            is_active: true,
            drive_email: drive_email.map(Into::into),
            created_by: None,
            otp_code_hash: None,
            otp_expires_at: None,
            otp_attempts: 0,
            otp_locked_until: None,
            failed_login_attempts: 0,
            locked_until: None,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item(id: &str, owner: &str) -> DriveItem {
        DriveItem {
            id: id.into(),
            name: "doc".into(),
            mime_type: "text/plain".into(),
            kind: DriveItemKind::File,
            owner_emails: vec![owner.into()],
            parents: vec![],
            size_bytes: None,
            modified_at: None,
            web_view_link: None,
        }
    }

    #[test]
    fn test_infer_uploader_matches_drive_linked_email() {
        let a = account("a@x.com", Some("a.drive@gmail.com"));
        let b = account("b@x.com", None);
        let candidates = vec![a.clone(), b];

        let inferred =
            LedgerReconciler::infer_uploader(&item("f1", "a.drive@gmail.com"), &candidates);
        assert_eq!(inferred.map(|acc| acc.id), Some(a.id));

        assert!(
            LedgerReconciler::infer_uploader(&item("f1", "stranger@x.com"), &candidates).is_none()
        );
    }

    #[tokio::test]
    async fn test_backfill_is_idempotent() {
        let ledger = Arc::new(MemoryLedger::new());
        let reconciler = LedgerReconciler::new(ledger.clone());
        let uploader = account("a@x.com", None);
        let item = item("f1", "a@x.com");

        let first = reconciler.backfill(&item, &uploader).await;
        let second = reconciler.backfill(&item, &uploader).await;
        assert!(first.completed() && second.completed());

        let record = driveport_auth::store::LedgerStore::get(ledger.as_ref(), "f1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.uploader_account_id, Some(uploader.id));
    }
}

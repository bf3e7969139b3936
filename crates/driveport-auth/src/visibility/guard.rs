//! Access guard: the authorization gate for item-targeted operations.

use std::sync::Arc;

use uuid::Uuid;

use driveport_core::error::AppError;
use driveport_core::result::AppResult;
use driveport_entity::account::Account;
use driveport_entity::ledger::model::DriveItemRecord;

use crate::store::LedgerStore;
use crate::visibility::resolver::{Visibility, VisibilityResolver};

/// Gates every read or mutation of a specific Drive item.
///
/// Composes the visibility resolver with the item ledger: access is
/// granted when the requester sees everything, when the item's recorded
/// uploader is in the requester's visible set, or when the requester is
/// an explicit share recipient of the item.
#[derive(Clone)]
pub struct AccessGuard {
    resolver: VisibilityResolver,
    ledger: Arc<dyn LedgerStore>,
}

impl std::fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGuard").finish()
    }
}

impl AccessGuard {
    /// Creates a new guard.
    pub fn new(resolver: VisibilityResolver, ledger: Arc<dyn LedgerStore>) -> Self {
        Self { resolver, ledger }
    }

    /// The resolver backing this guard.
    pub fn resolver(&self) -> &VisibilityResolver {
        &self.resolver
    }

    /// Resolves the requester's visibility.
    pub async fn visibility_for(&self, requester: &Account) -> AppResult<Visibility> {
        self.resolver.resolve(requester).await
    }

    /// Asserts that the requester may operate on the given item.
    ///
    /// Denial is always `FORBIDDEN`, never `NOT_FOUND`: an item whose
    /// ledger record is missing denies exactly like an item uploaded by a
    /// stranger, so existence is not leaked.
    pub async fn assert_access(&self, requester: &Account, item_id: &str) -> AppResult<()> {
        let visibility = self.resolver.resolve(requester).await?;
        if visibility.is_all() {
            return Ok(());
        }

        let record = self.ledger.get(item_id).await?;
        let allowed = record
            .map(|record| Self::record_allows(&visibility, requester.id, &record))
            .unwrap_or(false);

        if allowed {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "You do not have access to this Drive item",
            ))
        }
    }

    /// The record-level allow rule shared by [`assert_access`] and
    /// listing filtering: uploader in the visible set, or requester among
    /// the explicit recipients.
    ///
    /// [`assert_access`]: Self::assert_access
    pub fn record_allows(
        visibility: &Visibility,
        requester_id: Uuid,
        record: &DriveItemRecord,
    ) -> bool {
        if visibility.is_all() {
            return true;
        }
        record
            .uploader_account_id
            .map(|uploader| visibility.allows_uploader(uploader))
            .unwrap_or(false)
            || record.is_shared_with(requester_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::HierarchyDirectory;
    use crate::store::memory::{MemoryDirectory, MemoryLedger};
    use chrono::Utc;
    use driveport_entity::account::AccountRole;
    use driveport_entity::ledger::model::UpsertUploader;

    fn account(role: AccountRole, email: &str, created_by: Option<Uuid>) -> Account {
        Account {
            id: Uuid::new_v4(),
            username: email.split('@').next().unwrap().to_string(),
            email: email.to_string(),
            password_hash: "hash".into(),
            role,
            is_active: true,
            drive_email: None,
            created_by,
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

    struct Fixture {
        guard: AccessGuard,
        ledger: Arc<MemoryLedger>,
    }

    async fn fixture(accounts: &[&Account]) -> Fixture {
        let store = Arc::new(MemoryDirectory::new());
        for account in accounts {
            store.insert((*account).clone()).await;
        }
        let ledger = Arc::new(MemoryLedger::new());
        let resolver = VisibilityResolver::new(HierarchyDirectory::new(store));
        let guard = AccessGuard::new(resolver, ledger.clone() as Arc<dyn LedgerStore>);
        Fixture { guard, ledger }
    }

    async fn record_upload(ledger: &MemoryLedger, item_id: &str, uploader: &Account) {
        ledger
            .upsert_uploader(&UpsertUploader {
                item_id: item_id.into(),
                uploader_email: Some(uploader.email.clone()),
                uploader_account_id: Some(uploader.id),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_superadmin_accesses_anything() {
        let root = account(AccountRole::Superadmin, "root@x.com", None);
        let stranger = account(AccountRole::Client, "s@x.com", None);
        let fx = fixture(&[&root, &stranger]).await;
        record_upload(&fx.ledger, "f1", &stranger).await;

        fx.guard.assert_access(&root, "f1").await.unwrap();
        // Even an unledgered item is allowed for the ALL sentinel.
        fx.guard.assert_access(&root, "unknown").await.unwrap();
    }

    #[tokio::test]
    async fn test_manager_accesses_report_upload() {
        let manager = account(AccountRole::Manager, "m@x.com", None);
        let client = account(AccountRole::Client, "c@x.com", Some(manager.id));
        let fx = fixture(&[&manager, &client]).await;
        record_upload(&fx.ledger, "f1", &client).await;

        fx.guard.assert_access(&manager, "f1").await.unwrap();
    }

    #[tokio::test]
    async fn test_unrelated_client_is_forbidden() {
        let uploader = account(AccountRole::Client, "a@x.com", None);
        let outsider = account(AccountRole::Client, "b@x.com", None);
        let fx = fixture(&[&uploader, &outsider]).await;
        record_upload(&fx.ledger, "f1", &uploader).await;

        let err = fx.guard.assert_access(&outsider, "f1").await.unwrap_err();
        assert!(err.is_forbidden());
    }

    #[tokio::test]
    async fn test_explicit_share_overrides_hierarchy() {
        let uploader = account(AccountRole::Client, "a@x.com", None);
        let outsider = account(AccountRole::Client, "b@x.com", None);
        let fx = fixture(&[&uploader, &outsider]).await;
        record_upload(&fx.ledger, "f1", &uploader).await;
        fx.ledger.record_share("f1", &[outsider.id]).await.unwrap();

        fx.guard.assert_access(&outsider, "f1").await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_item_denies_non_superadmin() {
        let client = account(AccountRole::Client, "c@x.com", None);
        let fx = fixture(&[&client]).await;

        let err = fx.guard.assert_access(&client, "ghost").await.unwrap_err();
        assert!(err.is_forbidden());
    }

    #[tokio::test]
    async fn test_record_without_uploader_denies_unless_shared() {
        let client = account(AccountRole::Client, "c@x.com", None);
        let fx = fixture(&[&client]).await;
        // Ledger row exists but carries no uploader.
        fx.ledger.mark_auto_shared("f1").await.unwrap();

        let err = fx.guard.assert_access(&client, "f1").await.unwrap_err();
        assert!(err.is_forbidden());

        fx.ledger.record_share("f1", &[client.id]).await.unwrap();
        fx.guard.assert_access(&client, "f1").await.unwrap();
    }
}

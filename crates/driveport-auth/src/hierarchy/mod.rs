//! Hierarchy directory: point reads over the `created_by` forest.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use driveport_core::result::AppResult;
use driveport_entity::account::{Account, AccountRole};

use crate::store::DirectoryStore;

/// Maximum ancestor-walk depth. The hierarchy is a forest by
/// construction, so any walk longer than this indicates corrupted data.
pub const MAX_ANCESTOR_DEPTH: usize = 32;

/// Answers parent/child questions about the account hierarchy.
///
/// Every call is a point read against the store; no caching. Unknown ids
/// yield empty results, never errors.
#[derive(Clone)]
pub struct HierarchyDirectory {
    store: Arc<dyn DirectoryStore>,
}

impl std::fmt::Debug for HierarchyDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchyDirectory").finish()
    }
}

impl HierarchyDirectory {
    /// Creates a new directory over the given store.
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    /// Fetches an account by id.
    pub async fn account(&self, id: Uuid) -> AppResult<Option<Account>> {
        self.store.account_by_id(id).await
    }

    /// Fetches several accounts by id.
    pub async fn accounts(&self, ids: &[Uuid]) -> AppResult<Vec<Account>> {
        self.store.accounts_by_ids(ids).await
    }

    /// Who created this account. `None` for forest roots and for dangling
    /// `created_by` references.
    pub async fn creator_of(&self, account: &Account) -> AppResult<Option<Account>> {
        match account.created_by {
            Some(creator_id) => self.store.account_by_id(creator_id).await,
            None => Ok(None),
        }
    }

    /// Which accounts this account created, optionally filtered by role.
    pub async fn children_of(
        &self,
        account_id: Uuid,
        role: Option<AccountRole>,
    ) -> AppResult<Vec<Account>> {
        self.store.accounts_created_by(account_id, role).await
    }

    /// Accounts matching any of the given emails (primary or Drive-linked).
    pub async fn accounts_by_emails(&self, emails: &[String]) -> AppResult<Vec<Account>> {
        self.store.accounts_by_emails(emails).await
    }

    /// The chain of ancestors above an account, nearest first, excluding
    /// the account itself.
    ///
    /// The walk stops at the first account with no creator, at a dangling
    /// reference, at a repeated id, or at [`MAX_ANCESTOR_DEPTH`] — a
    /// malformed cycle therefore yields a truncated chain, not a hang.
    pub async fn ancestor_chain(&self, account: &Account) -> AppResult<Vec<Account>> {
        let mut chain = Vec::new();
        let mut visited: HashSet<Uuid> = HashSet::from([account.id]);
        let mut next = account.created_by;

        while let Some(id) = next {
            if chain.len() >= MAX_ANCESTOR_DEPTH || !visited.insert(id) {
                tracing::warn!(
                    account_id = %account.id,
                    "Ancestor walk terminated early; created_by data may be corrupted"
                );
                break;
            }
            match self.store.account_by_id(id).await? {
                Some(ancestor) => {
                    next = ancestor.created_by;
                    chain.push(ancestor);
                }
                None => break,
            }
        }

        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryDirectory;
    use chrono::Utc;

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

    #[tokio::test]
    async fn test_ancestor_chain_nearest_first() {
        let store = Arc::new(MemoryDirectory::new());
        let admin = account(AccountRole::Admin, "admin@x.com", None);
        let manager = account(AccountRole::Manager, "m@x.com", Some(admin.id));
        let client = account(AccountRole::Client, "c@x.com", Some(manager.id));
        store.insert(admin.clone()).await;
        store.insert(manager.clone()).await;
        store.insert(client.clone()).await;

        let directory = HierarchyDirectory::new(store);
        let chain = directory.ancestor_chain(&client).await.unwrap();
        let ids: Vec<Uuid> = chain.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![manager.id, admin.id]);
    }

    #[tokio::test]
    async fn test_ancestor_chain_survives_cycle() {
        let store = Arc::new(MemoryDirectory::new());
        let mut a = account(AccountRole::Manager, "a@x.com", None);
        let b = account(AccountRole::Manager, "b@x.com", Some(a.id));
        a.created_by = Some(b.id);
        store.insert(a.clone()).await;
        store.insert(b.clone()).await;

        let directory = HierarchyDirectory::new(store);
        let chain = directory.ancestor_chain(&a).await.unwrap();
        // The walk reaches b, then stops when it sees a again.
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].id, b.id);
    }

    #[tokio::test]
    async fn test_dangling_creator_yields_empty_chain() {
        let store = Arc::new(MemoryDirectory::new());
        let orphan = account(AccountRole::Client, "o@x.com", Some(Uuid::new_v4()));
        store.insert(orphan.clone()).await;

        let directory = HierarchyDirectory::new(store);
        let chain = directory.ancestor_chain(&orphan).await.unwrap();
        assert!(chain.is_empty());
    }
}

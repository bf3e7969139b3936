//! Shared fixtures: in-memory stores and a scripted Drive fake.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use driveport_auth::hierarchy::HierarchyDirectory;
use driveport_auth::store::memory::{MemoryDirectory, MemoryLedger};
use driveport_auth::store::{DirectoryStore, LedgerStore};
use driveport_auth::visibility::guard::AccessGuard;
use driveport_auth::visibility::resolver::VisibilityResolver;
use driveport_core::error::AppError;
use driveport_core::result::AppResult;
use driveport_core::traits::drive::{
    ByteStream, DriveClient, DriveItem, DriveItemKind, DrivePermission, FOLDER_MIME_TYPE,
    GrantRecipient, ListQuery, PermissionRole,
};
use driveport_core::types::ListPage;
use driveport_entity::account::{Account, AccountRole};
use driveport_service::context::RequestContext;
use driveport_service::item::{AutoSharePolicy, ItemService};

pub const ROOT: &str = "root";

/// In-memory Drive backend with scriptable failures.
#[derive(Default)]
pub struct FakeDrive {
    items: Mutex<HashMap<String, DriveItem>>,
    contents: Mutex<HashMap<String, Bytes>>,
    permissions: Mutex<HashMap<String, Vec<DrivePermission>>>,
    failing_grantees: Mutex<HashSet<String>>,
    counter: AtomicU32,
}

impl FakeDrive {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.counter.fetch_add(1, Ordering::SeqCst))
    }

    fn make_item(id: String, name: &str, mime_type: &str, parent: &str, owner: &str) -> DriveItem {
        DriveItem {
            id,
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            kind: DriveItemKind::from_mime_type(mime_type),
            owner_emails: vec![owner.to_lowercase()],
            parents: vec![parent.to_string()],
            size_bytes: None,
            modified_at: Some(Utc::now()),
            web_view_link: None,
        }
    }

    /// Seed a pre-existing item (e.g. created outside the application).
    pub async fn seed_item(&self, name: &str, mime_type: &str, parent: &str, owner: &str) -> String {
        let id = self.next_id("seed");
        let item = Self::make_item(id.clone(), name, mime_type, parent, owner);
        self.items.lock().await.insert(id.clone(), item);
        id
    }

    /// Make grants to the given email fail with an upstream error.
    pub async fn fail_grants_to(&self, email: &str) {
        self.failing_grantees
            .lock()
            .await
            .insert(email.to_lowercase());
    }

    /// The permission entries currently on an item.
    pub async fn permissions_of(&self, item_id: &str) -> Vec<DrivePermission> {
        self.permissions
            .lock()
            .await
            .get(item_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DriveClient for FakeDrive {
    async fn list(&self, query: &ListQuery) -> AppResult<ListPage<DriveItem>> {
        let items = self.items.lock().await;
        let matched = items
            .values()
            .filter(|item| {
                query
                    .parent_id
                    .as_ref()
                    .is_none_or(|parent| item.parents.contains(parent))
            })
            .filter(|item| {
                query
                    .name_equals
                    .as_ref()
                    .is_none_or(|name| &item.name == name)
            })
            .filter(|item| !query.folders_only || item.kind.is_folder())
            .cloned()
            .collect();
        Ok(ListPage::new(matched, None))
    }

    async fn get(&self, item_id: &str) -> AppResult<DriveItem> {
        self.items
            .lock()
            .await
            .get(item_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Drive item not found"))
    }

    async fn create_folder(&self, name: &str, parent_id: &str) -> AppResult<DriveItem> {
        let id = self.next_id("folder");
        let item = Self::make_item(id.clone(), name, FOLDER_MIME_TYPE, parent_id, "svc@app.test");
        self.items.lock().await.insert(id, item.clone());
        Ok(item)
    }

    async fn upload(
        &self,
        name: &str,
        mime_type: &str,
        parent_id: &str,
        content: Bytes,
    ) -> AppResult<DriveItem> {
        let id = self.next_id("file");
        let item = Self::make_item(id.clone(), name, mime_type, parent_id, "svc@app.test");
        self.items.lock().await.insert(id.clone(), item.clone());
        self.contents.lock().await.insert(id, content);
        Ok(item)
    }

    async fn rename(&self, item_id: &str, new_name: &str) -> AppResult<DriveItem> {
        let mut items = self.items.lock().await;
        let item = items
            .get_mut(item_id)
            .ok_or_else(|| AppError::not_found("Drive item not found"))?;
        item.name = new_name.to_string();
        Ok(item.clone())
    }

    async fn delete(&self, item_id: &str) -> AppResult<()> {
        self.items
            .lock()
            .await
            .remove(item_id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("Drive item not found"))
    }

    async fn grant_permission(
        &self,
        item_id: &str,
        recipient: &GrantRecipient,
        role: PermissionRole,
        _notify: bool,
    ) -> AppResult<DrivePermission> {
        let email = match recipient {
            GrantRecipient::UserEmail(email) => Some(email.to_lowercase()),
            GrantRecipient::Anyone => None,
        };

        if let Some(email) = &email {
            if self.failing_grantees.lock().await.contains(email) {
                return Err(AppError::upstream("Drive API returned 403: cannot share"));
            }
        }

        let permission = DrivePermission {
            id: self.next_id("perm"),
            grantee_type: if email.is_some() { "user" } else { "anyone" }.to_string(),
            email,
            role,
        };
        self.permissions
            .lock()
            .await
            .entry(item_id.to_string())
            .or_default()
            .push(permission.clone());
        Ok(permission)
    }

    async fn list_permissions(&self, item_id: &str) -> AppResult<Vec<DrivePermission>> {
        Ok(self.permissions_of(item_id).await)
    }

    async fn remove_permission(&self, item_id: &str, permission_id: &str) -> AppResult<()> {
        let mut permissions = self.permissions.lock().await;
        if let Some(entries) = permissions.get_mut(item_id) {
            entries.retain(|p| p.id != permission_id);
        }
        Ok(())
    }

    async fn download(&self, item_id: &str) -> AppResult<ByteStream> {
        let content = self
            .contents
            .lock()
            .await
            .get(item_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Drive item not found"))?;
        Ok(Box::pin(futures::stream::iter(vec![Ok(content)])))
    }
}

/// Everything an item-flow test needs.
pub struct TestEnv {
    pub directory: Arc<MemoryDirectory>,
    pub ledger: Arc<MemoryLedger>,
    pub drive: Arc<FakeDrive>,
    pub service: ItemService,
}

pub fn test_env() -> TestEnv {
    let directory = Arc::new(MemoryDirectory::new());
    let ledger = Arc::new(MemoryLedger::new());
    let drive = Arc::new(FakeDrive::new());

    let hierarchy = HierarchyDirectory::new(directory.clone() as Arc<dyn DirectoryStore>);
    let resolver = VisibilityResolver::new(hierarchy.clone());
    let guard = AccessGuard::new(resolver, ledger.clone() as Arc<dyn LedgerStore>);
    let autoshare = AutoSharePolicy::new(
        hierarchy,
        ledger.clone() as Arc<dyn LedgerStore>,
        drive.clone() as Arc<dyn DriveClient>,
    );
    let service = ItemService::new(
        guard,
        ledger.clone() as Arc<dyn LedgerStore>,
        drive.clone() as Arc<dyn DriveClient>,
        autoshare,
        ROOT.to_string(),
    );

    TestEnv {
        directory,
        ledger,
        drive,
        service,
    }
}

pub fn account(role: AccountRole, email: &str, created_by: Option<Uuid>) -> Account {
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

pub fn ctx(account: &Account) -> RequestContext {
    RequestContext::new(account.clone(), "127.0.0.1".to_string(), None)
}

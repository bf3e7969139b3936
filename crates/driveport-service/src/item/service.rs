//! Drive item service: guarded operations over the capability interface.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use driveport_auth::store::LedgerStore;
use driveport_auth::visibility::guard::AccessGuard;
use driveport_core::error::AppError;
use driveport_core::result::{AppResult, BestEffort};
use driveport_core::traits::drive::{
    ByteStream, DriveClient, DriveItem, DrivePermission, GrantRecipient, ListQuery, PermissionRole,
};
use driveport_core::types::ListPage;
use driveport_entity::account::Account;
use driveport_entity::ledger::model::{DriveItemRecord, UpsertUploader};

use crate::context::RequestContext;

use super::autoshare::{AutoShareOutcome, AutoSharePolicy};
use super::backfill::LedgerReconciler;

/// Parameters for a listing call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListItemsRequest {
    /// Folder to list; the workspace root when absent.
    pub parent_id: Option<String>,
    /// Cursor from a previous page.
    pub page_token: Option<String>,
    /// Requested page size.
    pub page_size: Option<u32>,
    /// Restrict to items the ledger recognizes.
    #[serde(default)]
    pub known_only: bool,
}

/// One visible item in a listing.
#[derive(Debug, Clone, Serialize)]
pub struct ListedItem {
    /// Drive metadata.
    #[serde(flatten)]
    pub item: DriveItem,
    /// The uploader's local account id, when known or inferred.
    pub uploader_account_id: Option<Uuid>,
    /// Whether the item was explicitly shared with the caller.
    pub explicitly_shared: bool,
}

/// Result of an upload or folder creation.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedItem {
    /// The created Drive item.
    pub item: DriveItem,
    /// What auto-share did, when it ran to completion.
    pub auto_share: Option<AutoShareOutcome>,
}

/// Parameters for an explicit share.
#[derive(Debug, Clone, Deserialize)]
pub struct ShareRequest {
    /// Local account to share with.
    pub account_id: Option<Uuid>,
    /// Email to share with (used when `account_id` is absent).
    pub email: Option<String>,
    /// Role to grant.
    pub role: PermissionRole,
}

/// A guarded download: metadata plus the content stream.
pub struct ItemDownload {
    /// Drive metadata for the downloaded item.
    pub item: DriveItem,
    /// The content bytes.
    pub stream: ByteStream,
}

/// Orchestrates all Drive item operations behind the access guard.
#[derive(Clone)]
pub struct ItemService {
    guard: AccessGuard,
    ledger: Arc<dyn LedgerStore>,
    drive: Arc<dyn DriveClient>,
    autoshare: AutoSharePolicy,
    reconciler: LedgerReconciler,
    root_folder_id: String,
}

impl std::fmt::Debug for ItemService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemService")
            .field("root_folder_id", &self.root_folder_id)
            .finish()
    }
}

impl ItemService {
    /// Creates a new item service.
    pub fn new(
        guard: AccessGuard,
        ledger: Arc<dyn LedgerStore>,
        drive: Arc<dyn DriveClient>,
        autoshare: AutoSharePolicy,
        root_folder_id: String,
    ) -> Self {
        let reconciler = LedgerReconciler::new(ledger.clone());
        Self {
            guard,
            ledger,
            drive,
            autoshare,
            reconciler,
            root_folder_id,
        }
    }

    fn parent_or_root(&self, parent_id: Option<String>) -> String {
        parent_id.unwrap_or_else(|| self.root_folder_id.clone())
    }

    /// Lists items visible to the caller under a folder.
    ///
    /// Each candidate is tested independently against the allow rule
    /// (visible uploader or explicit share). Unledgered items whose
    /// Drive-reported owner matches a visible account are allowed through
    /// and backfilled; ledgered items that were never auto-shared get a
    /// best-effort auto-share run.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        req: ListItemsRequest,
    ) -> AppResult<ListPage<ListedItem>> {
        let visibility = self.guard.visibility_for(&ctx.account).await?;
        let directory = self.guard.resolver().directory();

        let page = self
            .drive
            .list(&ListQuery {
                parent_id: Some(self.parent_or_root(req.parent_id)),
                page_size: req.page_size,
                page_token: req.page_token,
                ..Default::default()
            })
            .await?;

        let ids: Vec<String> = page.items.iter().map(|item| item.id.clone()).collect();
        let records: HashMap<String, DriveItemRecord> = self
            .ledger
            .get_many(&ids)
            .await?
            .into_iter()
            .map(|record| (record.item_id.clone(), record))
            .collect();

        // Accounts the inference step may match owner emails against:
        // the visible set, or (for the ALL sentinel) whoever the page's
        // owner emails resolve to.
        let candidates: Vec<Account> = match visibility.uploader_ids() {
            Some(ids) => {
                let ids: Vec<Uuid> = ids.iter().copied().collect();
                directory.accounts(&ids).await?
            }
            None => {
                let owner_emails: Vec<String> = page
                    .items
                    .iter()
                    .flat_map(|item| item.owner_emails.iter().cloned())
                    .collect();
                directory.accounts_by_emails(&owner_emails).await?
            }
        };

        let mut listed = Vec::new();
        let next_page_token = page.next_page_token;

        for item in page.items {
            let record = records.get(&item.id);
            let mut uploader_account_id = record.and_then(|r| r.uploader_account_id);
            let explicitly_shared = record
                .map(|r| r.is_shared_with(ctx.account_id()))
                .unwrap_or(false);

            let mut allowed = match record {
                Some(record) => {
                    AccessGuard::record_allows(&visibility, ctx.account_id(), record)
                }
                None => visibility.is_all(),
            };

            // Self-healing metadata: infer the uploader from the
            // Drive-reported owner when the ledger cannot match the item.
            if uploader_account_id.is_none() {
                if let Some(inferred) = LedgerReconciler::infer_uploader(&item, &candidates) {
                    self.reconciler.backfill(&item, inferred).await;
                    uploader_account_id = Some(inferred.id);
                    allowed = allowed || visibility.allows_uploader(inferred.id);
                }
            }

            if !allowed {
                continue;
            }
            if req.known_only && record.is_none() && uploader_account_id.is_none() {
                continue;
            }

            // Legacy items that predate auto-share get their run now.
            let never_auto_shared = record.map(|r| !r.is_auto_shared()).unwrap_or(true);
            if never_auto_shared {
                if let Some(uploader_id) = uploader_account_id {
                    let uploader = match candidates.iter().find(|a| a.id == uploader_id) {
                        Some(found) => Some(found.clone()),
                        None => directory.account(uploader_id).await.ok().flatten(),
                    };
                    if let Some(uploader) = uploader {
                        self.autoshare.auto_share(&uploader, &item.id).await;
                    }
                }
            }

            listed.push(ListedItem {
                item,
                uploader_account_id,
                explicitly_shared,
            });
        }

        Ok(ListPage::new(listed, next_page_token))
    }

    /// Fetches metadata for a single item.
    pub async fn get(&self, ctx: &RequestContext, item_id: &str) -> AppResult<DriveItem> {
        self.guard.assert_access(&ctx.account, item_id).await?;
        self.drive.get(item_id).await
    }

    /// Uploads a file and runs the auto-share policy.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        name: &str,
        mime_type: &str,
        parent_id: Option<String>,
        content: bytes::Bytes,
    ) -> AppResult<CreatedItem> {
        if name.trim().is_empty() {
            return Err(AppError::validation("File name cannot be empty"));
        }

        let parent = self.parent_or_root(parent_id);
        let item = self.drive.upload(name, mime_type, &parent, content).await?;

        info!(item_id = %item.id, uploader = %ctx.account.username, "File uploaded");

        self.ledger
            .upsert_uploader(&UpsertUploader {
                item_id: item.id.clone(),
                uploader_email: Some(ctx.account.sharing_email().to_lowercase()),
                uploader_account_id: Some(ctx.account_id()),
            })
            .await?;

        let auto_share = self.autoshare.auto_share(&ctx.account, &item.id).await;
        Ok(CreatedItem {
            item,
            auto_share: auto_share.value().cloned(),
        })
    }

    /// Creates a folder, refusing same-name siblings, and runs auto-share.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        name: &str,
        parent_id: Option<String>,
    ) -> AppResult<CreatedItem> {
        if name.trim().is_empty() {
            return Err(AppError::validation("Folder name cannot be empty"));
        }

        let parent = self.parent_or_root(parent_id);

        let existing = self
            .drive
            .list(&ListQuery {
                parent_id: Some(parent.clone()),
                name_equals: Some(name.to_string()),
                folders_only: true,
                ..Default::default()
            })
            .await?;
        if let Some(found) = existing.items.first() {
            return Err(AppError::conflict(format!(
                "Folder '{}' already exists (id: {})",
                found.name, found.id
            )));
        }

        let item = self.drive.create_folder(name, &parent).await?;

        info!(item_id = %item.id, creator = %ctx.account.username, "Folder created");

        self.ledger
            .upsert_uploader(&UpsertUploader {
                item_id: item.id.clone(),
                uploader_email: Some(ctx.account.sharing_email().to_lowercase()),
                uploader_account_id: Some(ctx.account_id()),
            })
            .await?;

        let auto_share = self.autoshare.auto_share(&ctx.account, &item.id).await;
        Ok(CreatedItem {
            item,
            auto_share: auto_share.value().cloned(),
        })
    }

    /// Renames an item.
    pub async fn rename(
        &self,
        ctx: &RequestContext,
        item_id: &str,
        new_name: &str,
    ) -> AppResult<DriveItem> {
        if new_name.trim().is_empty() {
            return Err(AppError::validation("Name cannot be empty"));
        }
        self.guard.assert_access(&ctx.account, item_id).await?;
        self.drive.rename(item_id, new_name).await
    }

    /// Deletes an item and, best-effort, its ledger record.
    pub async fn delete(&self, ctx: &RequestContext, item_id: &str) -> AppResult<()> {
        self.guard.assert_access(&ctx.account, item_id).await?;
        self.drive.delete(item_id).await?;

        BestEffort::from_result(self.ledger.delete(item_id).await, "ledger delete");
        Ok(())
    }

    /// Shares an item with a local account or an arbitrary email.
    pub async fn share(
        &self,
        ctx: &RequestContext,
        item_id: &str,
        req: ShareRequest,
    ) -> AppResult<DrivePermission> {
        self.guard.assert_access(&ctx.account, item_id).await?;

        let directory = self.guard.resolver().directory();
        let (email, recipient_account) = match (req.account_id, req.email) {
            (Some(account_id), _) => {
                let account = directory
                    .account(account_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Recipient account not found"))?;
                (account.sharing_email().to_lowercase(), Some(account))
            }
            (None, Some(email)) => {
                let email = email.to_lowercase();
                let account = directory
                    .accounts_by_emails(std::slice::from_ref(&email))
                    .await?
                    .into_iter()
                    .next();
                (email, account)
            }
            (None, None) => {
                return Err(AppError::validation(
                    "Either account_id or email is required",
                ));
            }
        };

        let permission = self
            .drive
            .grant_permission(item_id, &GrantRecipient::UserEmail(email), req.role, false)
            .await?;

        if let Some(account) = recipient_account {
            self.ledger.record_share(item_id, &[account.id]).await?;
        }

        info!(item_id, grantor = %ctx.account.username, "Item shared");
        Ok(permission)
    }

    /// Lists the Drive-side permissions on an item.
    pub async fn list_permissions(
        &self,
        ctx: &RequestContext,
        item_id: &str,
    ) -> AppResult<Vec<DrivePermission>> {
        self.guard.assert_access(&ctx.account, item_id).await?;
        self.drive.list_permissions(item_id).await
    }

    /// Removes a Drive-side permission from an item.
    pub async fn remove_permission(
        &self,
        ctx: &RequestContext,
        item_id: &str,
        permission_id: &str,
    ) -> AppResult<()> {
        self.guard.assert_access(&ctx.account, item_id).await?;
        self.drive.remove_permission(item_id, permission_id).await
    }

    /// Downloads an item's content.
    pub async fn download(&self, ctx: &RequestContext, item_id: &str) -> AppResult<ItemDownload> {
        self.guard.assert_access(&ctx.account, item_id).await?;
        let item = self.drive.get(item_id).await?;
        let stream = self.drive.download(item_id).await?;
        Ok(ItemDownload { item, stream })
    }
}

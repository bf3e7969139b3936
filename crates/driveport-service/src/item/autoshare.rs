//! Auto-share policy: who a newly created item is shared with, and how.
//!
//! Runs synchronously after every successful upload or folder creation,
//! and opportunistically for legacy items discovered during listing that
//! were never auto-shared. The whole policy is best-effort: no failure
//! in here may fail the operation that triggered it.

use std::sync::Arc;

use uuid::Uuid;

use driveport_auth::hierarchy::HierarchyDirectory;
use driveport_auth::store::LedgerStore;
use driveport_core::result::{AppResult, BestEffort};
use driveport_core::traits::drive::{DriveClient, DriveItemKind, GrantRecipient, PermissionRole};
use driveport_entity::account::{Account, AccountRole};

/// One planned or executed permission grant.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RecipientGrant {
    /// Recipient email, lowercased.
    pub email: String,
    /// Role to grant.
    pub role: PermissionRole,
}

/// What an auto-share run did.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AutoShareOutcome {
    /// The item that was shared.
    pub item_id: String,
    /// Grants that succeeded.
    pub granted: Vec<RecipientGrant>,
    /// Grants that failed and were skipped.
    pub failed: Vec<RecipientGrant>,
}

/// Computes auto-share recipients and applies the grants.
#[derive(Clone)]
pub struct AutoSharePolicy {
    directory: HierarchyDirectory,
    ledger: Arc<dyn LedgerStore>,
    drive: Arc<dyn DriveClient>,
}

impl std::fmt::Debug for AutoSharePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoSharePolicy").finish()
    }
}

impl AutoSharePolicy {
    /// Creates a new policy.
    pub fn new(
        directory: HierarchyDirectory,
        ledger: Arc<dyn LedgerStore>,
        drive: Arc<dyn DriveClient>,
    ) -> Self {
        Self {
            directory,
            ledger,
            drive,
        }
    }

    /// Runs the policy for an uploaded or newly created item.
    ///
    /// Every step is isolated: a failed kind lookup degrades to
    /// [`DriveItemKind::Unknown`], each recipient grant fails alone, and
    /// ledger recording failures are logged and dropped.
    pub async fn auto_share(&self, uploader: &Account, item_id: &str) -> BestEffort<AutoShareOutcome> {
        let recipients = match self.plan(uploader, item_id).await {
            Ok(recipients) => recipients,
            Err(err) => return BestEffort::from_result(Err(err), "auto-share planning"),
        };

        let mut outcome = AutoShareOutcome {
            item_id: item_id.to_string(),
            granted: Vec::new(),
            failed: Vec::new(),
        };

        for grant in recipients {
            let result = self
                .drive
                .grant_permission(
                    item_id,
                    &GrantRecipient::UserEmail(grant.email.clone()),
                    grant.role,
                    false,
                )
                .await;

            match result {
                Ok(_) => outcome.granted.push(grant),
                Err(err) => {
                    tracing::warn!(
                        item_id,
                        recipient = %grant.email,
                        error = %err,
                        "Auto-share grant failed; continuing with remaining recipients"
                    );
                    outcome.failed.push(grant);
                }
            }
        }

        // Resolve granted emails back to local accounts and stamp the
        // ledger. Its own failure must not surface either.
        let recorded = self.record(&outcome).await;
        if let Err(err) = recorded {
            tracing::warn!(item_id, error = %err, "Auto-share ledger recording failed");
        }

        BestEffort::Completed(outcome)
    }

    /// Gathers the hierarchy context and plans the recipient set.
    async fn plan(&self, uploader: &Account, item_id: &str) -> AppResult<Vec<RecipientGrant>> {
        let ancestors = self.directory.ancestor_chain(uploader).await?;

        let direct_clients = if uploader.role == AccountRole::Manager {
            self.directory
                .children_of(uploader.id, Some(AccountRole::Client))
                .await?
        } else {
            Vec::new()
        };

        // Kind lookup failure is "unknown kind", not an abort.
        let kind = match self.drive.get(item_id).await {
            Ok(item) => item.kind,
            Err(err) => {
                tracing::warn!(item_id, error = %err, "Item kind lookup failed");
                DriveItemKind::Unknown
            }
        };

        Ok(compute_recipients(uploader, &ancestors, &direct_clients, kind))
    }

    async fn record(&self, outcome: &AutoShareOutcome) -> AppResult<()> {
        let emails: Vec<String> = outcome.granted.iter().map(|g| g.email.clone()).collect();
        if !emails.is_empty() {
            let accounts = self.directory.accounts_by_emails(&emails).await?;
            let ids: Vec<Uuid> = accounts.iter().map(|a| a.id).collect();
            self.ledger.record_share(&outcome.item_id, &ids).await?;
        }
        self.ledger.mark_auto_shared(&outcome.item_id).await
    }
}

/// Computes the recipient list and per-recipient roles.
///
/// Recipients are the uploader's ancestor chain (each ancestor's sharing
/// email), plus every direct client when the uploader is a manager. The
/// uploader's own email never appears. Roles: `reader` by default,
/// `writer` for everyone when a manager shares a folder, and `writer`
/// for the direct manager of a client uploader regardless of the default
/// — the most specific rule wins.
pub fn compute_recipients(
    uploader: &Account,
    ancestors: &[Account],
    direct_clients: &[Account],
    kind: DriveItemKind,
) -> Vec<RecipientGrant> {
    let default_role = if uploader.role == AccountRole::Manager && kind.is_folder() {
        PermissionRole::Writer
    } else {
        PermissionRole::Reader
    };

    let manager_email = (uploader.role == AccountRole::Client)
        .then(|| ancestors.first().map(|a| a.sharing_email().to_lowercase()))
        .flatten();

    let mut grants: Vec<RecipientGrant> = Vec::new();
    let mut push = |email: String, role: PermissionRole| {
        if uploader.matches_email(&email) {
            return;
        }
        if let Some(existing) = grants.iter_mut().find(|g| g.email == email) {
            // Escalate, never downgrade.
            if role == PermissionRole::Writer {
                existing.role = role;
            }
            return;
        }
        grants.push(RecipientGrant { email, role });
    };

    for ancestor in ancestors {
        let email = ancestor.sharing_email().to_lowercase();
        let role = if manager_email.as_deref() == Some(email.as_str()) {
            PermissionRole::Writer
        } else {
            default_role
        };
        push(email, role);
    }

    for client in direct_clients {
        push(client.sharing_email().to_lowercase(), default_role);
    }

    grants
}

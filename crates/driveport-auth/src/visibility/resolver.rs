//! Per-request computation of which uploaders an account may see.

use std::collections::HashSet;

use uuid::Uuid;

use driveport_core::result::AppResult;
use driveport_entity::account::{Account, AccountRole};

use crate::hierarchy::HierarchyDirectory;

/// The set of uploader identities a requester is entitled to see.
///
/// Derived per request, never persisted. When not [`Visibility::All`],
/// the set always contains the requester's own id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// No filtering: every item is visible (superadmin).
    All,
    /// Items from exactly these uploader account ids are visible.
    Uploaders(HashSet<Uuid>),
}

impl Visibility {
    /// Whether this is the unfiltered sentinel.
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Whether items uploaded by the given account are visible.
    pub fn allows_uploader(&self, uploader_id: Uuid) -> bool {
        match self {
            Self::All => true,
            Self::Uploaders(ids) => ids.contains(&uploader_id),
        }
    }

    /// The concrete id set, if filtering applies.
    pub fn uploader_ids(&self) -> Option<&HashSet<Uuid>> {
        match self {
            Self::All => None,
            Self::Uploaders(ids) => Some(ids),
        }
    }
}

/// Computes the visible-uploader set for a requesting account.
#[derive(Debug, Clone)]
pub struct VisibilityResolver {
    directory: HierarchyDirectory,
}

impl VisibilityResolver {
    /// Creates a new resolver over the given directory.
    pub fn new(directory: HierarchyDirectory) -> Self {
        Self { directory }
    }

    /// The underlying hierarchy directory.
    pub fn directory(&self) -> &HierarchyDirectory {
        &self.directory
    }

    /// Resolves the set of uploader ids visible to the requester.
    ///
    /// - superadmin sees everything;
    /// - admin sees itself, its direct managers, its direct clients, and
    ///   the clients of its direct managers;
    /// - manager sees itself and all of its direct reports regardless of
    ///   role;
    /// - client sees itself and its creator.
    ///
    /// Missing or dangling `created_by` references simply shrink the
    /// affected branch; they never produce an error.
    pub async fn resolve(&self, requester: &Account) -> AppResult<Visibility> {
        let visibility = match requester.role {
            AccountRole::Superadmin => Visibility::All,
            AccountRole::Admin => {
                let mut ids = HashSet::from([requester.id]);

                let managers = self
                    .directory
                    .children_of(requester.id, Some(AccountRole::Manager))
                    .await?;
                let clients = self
                    .directory
                    .children_of(requester.id, Some(AccountRole::Client))
                    .await?;

                ids.extend(clients.iter().map(|a| a.id));
                for manager in &managers {
                    ids.insert(manager.id);
                    let nested = self
                        .directory
                        .children_of(manager.id, Some(AccountRole::Client))
                        .await?;
                    ids.extend(nested.iter().map(|a| a.id));
                }

                Visibility::Uploaders(ids)
            }
            AccountRole::Manager => {
                let mut ids = HashSet::from([requester.id]);
                let reports = self.directory.children_of(requester.id, None).await?;
                ids.extend(reports.iter().map(|a| a.id));
                Visibility::Uploaders(ids)
            }
            AccountRole::Client => {
                let mut ids = HashSet::from([requester.id]);
                if let Some(creator_id) = requester.created_by {
                    ids.insert(creator_id);
                }
                Visibility::Uploaders(ids)
            }
        };

        Ok(visibility)
    }
}

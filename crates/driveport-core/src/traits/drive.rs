//! Drive capability trait — the application's only boundary to Google Drive.
//!
//! The trait is defined here in `driveport-core` and implemented against
//! the real Drive REST API in `driveport-drive`. Services depend on the
//! trait only, so tests can substitute a scripted in-memory client.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// A byte stream type used for downloading file contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Folder MIME type used by Drive.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
/// Shortcut MIME type used by Drive.
pub const SHORTCUT_MIME_TYPE: &str = "application/vnd.google-apps.shortcut";

/// What kind of item a Drive id refers to.
///
/// `Unknown` covers metadata lookups that failed or returned no usable
/// MIME type; callers treat it as "not a folder" rather than aborting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveItemKind {
    /// A folder.
    Folder,
    /// A regular file.
    File,
    /// Kind could not be determined.
    Unknown,
}

impl DriveItemKind {
    /// Classify a Drive MIME type.
    pub fn from_mime_type(mime_type: &str) -> Self {
        if mime_type == FOLDER_MIME_TYPE {
            Self::Folder
        } else {
            Self::File
        }
    }

    /// Whether this kind is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder)
    }
}

/// Metadata for a single Drive item as reported by the Drive API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveItem {
    /// Opaque Drive item id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// MIME type as reported by Drive.
    pub mime_type: String,
    /// Folder / file classification derived from the MIME type.
    pub kind: DriveItemKind,
    /// Emails of the Drive-side owners, lowercased.
    pub owner_emails: Vec<String>,
    /// Parent folder ids.
    pub parents: Vec<String>,
    /// Size in bytes, absent for folders and Google-native documents.
    pub size_bytes: Option<u64>,
    /// Last modification time reported by Drive (RFC 3339).
    pub modified_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Browser link to the item.
    pub web_view_link: Option<String>,
}

impl DriveItem {
    /// The first Drive-reported owner email, if any.
    pub fn primary_owner_email(&self) -> Option<&str> {
        self.owner_emails.first().map(String::as_str)
    }
}

/// Permission role grantable on a Drive item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionRole {
    /// Read-only access.
    Reader,
    /// Read and comment access.
    Commenter,
    /// Read and write access.
    Writer,
}

impl PermissionRole {
    /// The Drive API wire name for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::Commenter => "commenter",
            Self::Writer => "writer",
        }
    }
}

impl std::fmt::Display for PermissionRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PermissionRole {
    type Err = crate::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reader" => Ok(Self::Reader),
            "commenter" => Ok(Self::Commenter),
            "writer" => Ok(Self::Writer),
            _ => Err(crate::AppError::validation(format!(
                "Invalid permission role: '{s}'. Expected one of: reader, commenter, writer"
            ))),
        }
    }
}

/// Who a permission grant targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantRecipient {
    /// A specific user, addressed by email.
    UserEmail(String),
    /// Anyone with the link.
    Anyone,
}

/// A permission entry on a Drive item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrivePermission {
    /// Drive-side permission id.
    pub id: String,
    /// Grantee type as reported by Drive ("user", "anyone", ...).
    pub grantee_type: String,
    /// Grantee email, present for user grants.
    pub email: Option<String>,
    /// Granted role.
    pub role: PermissionRole,
}

/// Filter and cursor parameters for a Drive listing call.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Restrict to children of this folder.
    pub parent_id: Option<String>,
    /// Restrict to items with exactly this name.
    pub name_equals: Option<String>,
    /// Restrict to folders only.
    pub folders_only: bool,
    /// Requested page size.
    pub page_size: Option<u32>,
    /// Opaque cursor from a previous page.
    pub page_token: Option<String>,
}

/// Thin capability interface over the Google Drive API.
///
/// Every method is a single upstream call. Failures surface once as
/// `ErrorKind::Upstream` (or `NotConfigured` when credentials are absent)
/// and are never retried here.
#[async_trait]
pub trait DriveClient: Send + Sync + 'static {
    /// List items matching a query, one page at a time.
    async fn list(&self, query: &ListQuery) -> AppResult<crate::types::ListPage<DriveItem>>;

    /// Fetch metadata for a single item, resolving shortcuts to their
    /// target id and MIME type.
    async fn get(&self, item_id: &str) -> AppResult<DriveItem>;

    /// Create a folder under the given parent.
    async fn create_folder(&self, name: &str, parent_id: &str) -> AppResult<DriveItem>;

    /// Upload a file under the given parent.
    async fn upload(
        &self,
        name: &str,
        mime_type: &str,
        parent_id: &str,
        content: Bytes,
    ) -> AppResult<DriveItem>;

    /// Rename an item.
    async fn rename(&self, item_id: &str, new_name: &str) -> AppResult<DriveItem>;

    /// Delete an item.
    async fn delete(&self, item_id: &str) -> AppResult<()>;

    /// Grant a permission on an item. `notify` controls the Drive-side
    /// notification email to the grantee.
    async fn grant_permission(
        &self,
        item_id: &str,
        recipient: &GrantRecipient,
        role: PermissionRole,
        notify: bool,
    ) -> AppResult<DrivePermission>;

    /// List the permissions on an item.
    async fn list_permissions(&self, item_id: &str) -> AppResult<Vec<DrivePermission>>;

    /// Remove a permission from an item by permission id.
    async fn remove_permission(&self, item_id: &str, permission_id: &str) -> AppResult<()>;

    /// Download the binary content of a file.
    async fn download(&self, item_id: &str) -> AppResult<ByteStream>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_mime_type() {
        assert_eq!(
            DriveItemKind::from_mime_type(FOLDER_MIME_TYPE),
            DriveItemKind::Folder
        );
        assert_eq!(
            DriveItemKind::from_mime_type("image/png"),
            DriveItemKind::File
        );
    }

    #[test]
    fn test_permission_role_parse() {
        assert_eq!(
            "WRITER".parse::<PermissionRole>().unwrap(),
            PermissionRole::Writer
        );
        assert!("owner".parse::<PermissionRole>().is_err());
    }
}

//! Google Drive REST v3 client.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use driveport_core::config::drive::DriveConfig;
use driveport_core::error::AppError;
use driveport_core::result::AppResult;
use driveport_core::traits::drive::{
    ByteStream, DriveClient, DriveItem, DriveItemKind, DrivePermission, GrantRecipient, ListQuery,
    PermissionRole, SHORTCUT_MIME_TYPE,
};
use driveport_core::types::ListPage;
use driveport_core::types::pagination::clamp_page_size;

use crate::query;
use crate::token::AccessTokenSource;

/// Item fields requested from every metadata call.
const ITEM_FIELDS: &str =
    "id,name,mimeType,owners(emailAddress),parents,size,modifiedTime,webViewLink,shortcutDetails";

/// Boundary for multipart/related upload bodies.
const UPLOAD_BOUNDARY: &str = "driveport_upload_boundary";

/// `DriveClient` implementation against the Google Drive REST API.
pub struct GoogleDriveClient {
    http: reqwest::Client,
    config: DriveConfig,
    tokens: Arc<dyn AccessTokenSource>,
}

impl std::fmt::Debug for GoogleDriveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleDriveClient")
            .field("api_base_url", &self.config.api_base_url)
            .finish()
    }
}

/// Wire shape of a Drive file resource.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiFile {
    id: String,
    name: String,
    mime_type: String,
    #[serde(default)]
    owners: Vec<ApiOwner>,
    #[serde(default)]
    parents: Vec<String>,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    modified_time: Option<DateTime<Utc>>,
    #[serde(default)]
    web_view_link: Option<String>,
    #[serde(default)]
    shortcut_details: Option<ApiShortcutDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiOwner {
    #[serde(default)]
    email_address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiShortcutDetails {
    #[serde(default)]
    target_id: Option<String>,
    #[serde(default)]
    target_mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiFileList {
    #[serde(default)]
    files: Vec<ApiFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPermission {
    id: String,
    #[serde(rename = "type")]
    grantee_type: String,
    #[serde(default)]
    email_address: Option<String>,
    role: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPermissionList {
    #[serde(default)]
    permissions: Vec<ApiPermission>,
}

impl ApiFile {
    /// Convert to the boundary type, following shortcuts to their target.
    fn into_item(self) -> DriveItem {
        let (id, mime_type) = if self.mime_type == SHORTCUT_MIME_TYPE {
            let details = self.shortcut_details.unwrap_or(ApiShortcutDetails {
                target_id: None,
                target_mime_type: None,
            });
            (
                details.target_id.unwrap_or(self.id),
                details
                    .target_mime_type
                    .unwrap_or_else(|| "application/octet-stream".to_string()),
            )
        } else {
            (self.id, self.mime_type)
        };

        DriveItem {
            kind: DriveItemKind::from_mime_type(&mime_type),
            id,
            name: self.name,
            mime_type,
            owner_emails: self
                .owners
                .into_iter()
                .filter_map(|o| o.email_address)
                .map(|e| e.to_lowercase())
                .collect(),
            parents: self.parents,
            size_bytes: self.size.and_then(|s| s.parse().ok()),
            modified_at: self.modified_time,
            web_view_link: self.web_view_link,
        }
    }
}

impl ApiPermission {
    fn into_permission(self) -> AppResult<DrivePermission> {
        Ok(DrivePermission {
            id: self.id,
            grantee_type: self.grantee_type,
            email: self.email_address.map(|e| e.to_lowercase()),
            role: self.role.parse()?,
        })
    }
}

impl GoogleDriveClient {
    /// Creates a new client.
    pub fn new(
        http: reqwest::Client,
        config: DriveConfig,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> Self {
        Self {
            http,
            config,
            tokens,
        }
    }

    async fn bearer(&self) -> AppResult<String> {
        self.tokens.access_token().await
    }

    /// Map a non-success response to an error, preserving upstream detail.
    async fn check(response: reqwest::Response) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::NOT_FOUND {
            Err(AppError::not_found("Drive item not found"))
        } else {
            Err(AppError::upstream(format!(
                "Drive API returned {status}: {body}"
            )))
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> AppResult<T> {
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::upstream(format!("Malformed Drive response: {e}")))
    }

    fn files_url(&self, suffix: &str) -> String {
        format!("{}/files{}", self.config.api_base_url, suffix)
    }
}

#[async_trait]
impl DriveClient for GoogleDriveClient {
    async fn list(&self, list_query: &ListQuery) -> AppResult<ListPage<DriveItem>> {
        let token = self.bearer().await?;
        let q = query::build(list_query);
        debug!(q = %q, "Listing Drive items");

        let fields = format!("nextPageToken,files({ITEM_FIELDS})");
        let page_size = clamp_page_size(list_query.page_size).to_string();
        let mut request = self
            .http
            .get(self.files_url(""))
            .bearer_auth(token)
            .query(&[
                ("q", q.as_str()),
                ("fields", fields.as_str()),
                ("pageSize", page_size.as_str()),
            ]);
        if let Some(page_token) = &list_query.page_token {
            request = request.query(&[("pageToken", page_token.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Drive list request failed: {e}")))?;
        let list: ApiFileList = Self::get_json(response).await?;

        Ok(ListPage::new(
            list.files.into_iter().map(ApiFile::into_item).collect(),
            list.next_page_token,
        ))
    }

    async fn get(&self, item_id: &str) -> AppResult<DriveItem> {
        let token = self.bearer().await?;
        let response = self
            .http
            .get(self.files_url(&format!("/{item_id}")))
            .bearer_auth(token)
            .query(&[("fields", ITEM_FIELDS)])
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Drive metadata request failed: {e}")))?;

        let file: ApiFile = Self::get_json(response).await?;
        Ok(file.into_item())
    }

    async fn create_folder(&self, name: &str, parent_id: &str) -> AppResult<DriveItem> {
        let token = self.bearer().await?;
        let body = json!({
            "name": name,
            "mimeType": driveport_core::traits::drive::FOLDER_MIME_TYPE,
            "parents": [parent_id],
        });

        let response = self
            .http
            .post(self.files_url(""))
            .bearer_auth(token)
            .query(&[("fields", ITEM_FIELDS)])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Drive folder creation failed: {e}")))?;

        let file: ApiFile = Self::get_json(response).await?;
        Ok(file.into_item())
    }

    async fn upload(
        &self,
        name: &str,
        mime_type: &str,
        parent_id: &str,
        content: Bytes,
    ) -> AppResult<DriveItem> {
        let token = self.bearer().await?;
        let metadata = json!({
            "name": name,
            "parents": [parent_id],
        });

        // Drive's simple upload wants multipart/related: a JSON metadata
        // part followed by the media part.
        let mut body = Vec::with_capacity(content.len() + 512);
        body.extend_from_slice(format!("--{UPLOAD_BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
        body.extend_from_slice(metadata.to_string().as_bytes());
        body.extend_from_slice(format!("\r\n--{UPLOAD_BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(format!("Content-Type: {mime_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(&content);
        body.extend_from_slice(format!("\r\n--{UPLOAD_BOUNDARY}--").as_bytes());

        let response = self
            .http
            .post(format!("{}/files", self.config.upload_base_url))
            .bearer_auth(token)
            .query(&[("uploadType", "multipart"), ("fields", ITEM_FIELDS)])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={UPLOAD_BOUNDARY}"),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Drive upload failed: {e}")))?;

        let file: ApiFile = Self::get_json(response).await?;
        Ok(file.into_item())
    }

    async fn rename(&self, item_id: &str, new_name: &str) -> AppResult<DriveItem> {
        let token = self.bearer().await?;
        let response = self
            .http
            .patch(self.files_url(&format!("/{item_id}")))
            .bearer_auth(token)
            .query(&[("fields", ITEM_FIELDS)])
            .json(&json!({ "name": new_name }))
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Drive rename failed: {e}")))?;

        let file: ApiFile = Self::get_json(response).await?;
        Ok(file.into_item())
    }

    async fn delete(&self, item_id: &str) -> AppResult<()> {
        let token = self.bearer().await?;
        let response = self
            .http
            .delete(self.files_url(&format!("/{item_id}")))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Drive delete failed: {e}")))?;

        Self::check(response).await?;
        Ok(())
    }

    async fn grant_permission(
        &self,
        item_id: &str,
        recipient: &GrantRecipient,
        role: PermissionRole,
        notify: bool,
    ) -> AppResult<DrivePermission> {
        let token = self.bearer().await?;
        let body = match recipient {
            GrantRecipient::UserEmail(email) => json!({
                "type": "user",
                "emailAddress": email,
                "role": role.as_str(),
            }),
            GrantRecipient::Anyone => json!({
                "type": "anyone",
                "role": role.as_str(),
            }),
        };

        let response = self
            .http
            .post(self.files_url(&format!("/{item_id}/permissions")))
            .bearer_auth(token)
            .query(&[
                ("sendNotificationEmail", if notify { "true" } else { "false" }),
                ("fields", "id,type,emailAddress,role"),
            ])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Drive permission grant failed: {e}")))?;

        let permission: ApiPermission = Self::get_json(response).await?;
        permission.into_permission()
    }

    async fn list_permissions(&self, item_id: &str) -> AppResult<Vec<DrivePermission>> {
        let token = self.bearer().await?;
        let response = self
            .http
            .get(self.files_url(&format!("/{item_id}/permissions")))
            .bearer_auth(token)
            .query(&[("fields", "permissions(id,type,emailAddress,role)")])
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Drive permission list failed: {e}")))?;

        let list: ApiPermissionList = Self::get_json(response).await?;
        list.permissions
            .into_iter()
            .map(ApiPermission::into_permission)
            .collect()
    }

    async fn remove_permission(&self, item_id: &str, permission_id: &str) -> AppResult<()> {
        let token = self.bearer().await?;
        let response = self
            .http
            .delete(self.files_url(&format!("/{item_id}/permissions/{permission_id}")))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Drive permission removal failed: {e}")))?;

        Self::check(response).await?;
        Ok(())
    }

    async fn download(&self, item_id: &str) -> AppResult<ByteStream> {
        let token = self.bearer().await?;
        let response = self
            .http
            .get(self.files_url(&format!("/{item_id}")))
            .bearer_auth(token)
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Drive download failed: {e}")))?;

        let response = Self::check(response).await?;
        let stream = response.bytes_stream().map_err(std::io::Error::other);
        Ok(Box::pin(stream))
    }
}

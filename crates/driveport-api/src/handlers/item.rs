//! Drive item handlers: listing, upload, folders, sharing, download.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use validator::Validate;

use driveport_core::error::AppError;
use driveport_core::traits::drive::PermissionRole;
use driveport_service::item::service::{ListItemsRequest, ShareRequest};

use crate::dto::request::{CreateFolderRequest, RenameRequest, ShareItemRequest};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/drive/items?parent_id=&page_token=&page_size=&known_only=
pub async fn list_items(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(req): Query<ListItemsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let page = state.item_service.list(auth.context(), req).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "items": page.items,
            "next_page_token": page.next_page_token,
        }
    })))
}

/// GET /api/drive/items/{id}
pub async fn get_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let item = state.item_service.get(auth.context(), &id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": item })))
}

/// POST /api/drive/items/upload (multipart: file, name?, parent_id?)
pub async fn upload_item(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut parent_id: Option<String> = None;
    let mut name_override: Option<String> = None;
    let mut file: Option<(String, String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed multipart body: {e}")))?
    {
        match field.name().unwrap_or_default() {
            "parent_id" => {
                parent_id = Some(field.text().await.map_err(|e| {
                    AppError::validation(format!("Invalid parent_id field: {e}"))
                })?);
            }
            "name" => {
                name_override = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::validation(format!("Invalid name field: {e}")))?,
                );
            }
            "file" => {
                let file_name = field.file_name().unwrap_or("upload.bin").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Invalid file field: {e}")))?;
                file = Some((file_name, content_type, data));
            }
            _ => {}
        }
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::validation("Missing 'file' field"))?;
    let name = name_override.unwrap_or(file_name);

    let created = state
        .item_service
        .upload(auth.context(), &name, &content_type, parent_id, data)
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "data": created })))
}

/// POST /api/drive/folders
pub async fn create_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateFolderRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let created = state
        .item_service
        .create_folder(auth.context(), &req.name, req.parent_id)
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "data": created })))
}

/// PUT /api/drive/items/{id}/rename
pub async fn rename_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let item = state
        .item_service
        .rename(auth.context(), &id, &req.name)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": item })))
}

/// DELETE /api/drive/items/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.item_service.delete(auth.context(), &id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "data": { "message": "Item deleted" }
    })))
}

/// POST /api/drive/items/{id}/share
pub async fn share_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<ShareItemRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let role = match req.role.as_deref() {
        Some(role) => role.parse::<PermissionRole>()?,
        None => PermissionRole::Reader,
    };

    let permission = state
        .item_service
        .share(
            auth.context(),
            &id,
            ShareRequest {
                account_id: req.account_id,
                email: req.email,
                role,
            },
        )
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "data": permission })))
}

/// GET /api/drive/items/{id}/permissions
pub async fn list_permissions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let permissions = state
        .item_service
        .list_permissions(auth.context(), &id)
        .await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": permissions }),
    ))
}

/// DELETE /api/drive/items/{id}/permissions/{perm_id}
pub async fn remove_permission(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, perm_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .item_service
        .remove_permission(auth.context(), &id, &perm_id)
        .await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "data": { "message": "Permission removed" }
    })))
}

/// GET /api/drive/items/{id}/download
pub async fn download_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let download = state.item_service.download(auth.context(), &id).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, download.item.mime_type.clone())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download.item.name),
        )
        .body(Body::from_stream(download.stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

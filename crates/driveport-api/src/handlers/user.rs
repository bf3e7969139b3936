//! Member management and self-service profile handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;
use validator::Validate;

use driveport_core::error::AppError;
use driveport_entity::account::model::UpdateProfile;
use driveport_service::user::service as user_service;

use crate::dto::request::{
    AssignRoleRequest, ChangePasswordRequest, CreateMemberRequest, UpdateProfileRequest,
};
use crate::dto::response::AccountResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users/members
pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let members = state.user_service.list_members(auth.context()).await?;
    let members: Vec<AccountResponse> = members.into_iter().map(AccountResponse::from).collect();

    Ok(Json(serde_json::json!({ "success": true, "data": members })))
}

/// POST /api/users/members
pub async fn create_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateMemberRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let member = state
        .user_service
        .create_member(
            auth.context(),
            user_service::CreateMemberRequest {
                username: req.username,
                email: req.email,
                password: req.password,
                role: req.role,
                drive_email: req.drive_email,
            },
        )
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": AccountResponse::from(member),
    })))
}

/// PUT /api/users/members/{id}/role
pub async fn assign_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(member_id): Path<Uuid>,
    Json(req): Json<AssignRoleRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let member = state
        .user_service
        .assign_role(auth.context(), member_id, req.role)
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": AccountResponse::from(member),
    })))
}

/// PUT /api/users/me
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let account = state
        .user_service
        .update_profile(
            auth.context(),
            UpdateProfile {
                email: req.email,
                drive_email: req.drive_email,
            },
        )
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": AccountResponse::from(account),
    })))
}

/// PUT /api/users/me/password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .user_service
        .change_password(auth.context(), &req.current_password, &req.new_password)
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": { "message": "Password changed" }
    })))
}

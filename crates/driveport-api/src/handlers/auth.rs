//! Authentication handlers: register, login, refresh, me.

use axum::Json;
use axum::extract::State;
use validator::Validate;

use driveport_core::error::AppError;
use driveport_service::user::service as user_service;

use crate::dto::request::{LoginRequest, RefreshRequest, RegisterRequest};
use crate::dto::response::AccountResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let account = state
        .user_service
        .register(user_service::RegisterRequest {
            username: req.username,
            email: req.email,
            password: req.password,
            drive_email: req.drive_email,
        })
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": AccountResponse::from(account),
    })))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = state.user_service.login(&req.username, &req.password).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "account": AccountResponse::from(result.account),
            "tokens": result.tokens,
        }
    })))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (access_token, expires_at) = state.user_service.refresh(&req.refresh_token).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "access_token": access_token,
            "access_expires_at": expires_at,
        }
    })))
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "data": AccountResponse::from(auth.account.clone()),
    }))
}

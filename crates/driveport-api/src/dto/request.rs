//! Request DTOs with validation rules.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use driveport_entity::account::AccountRole;

/// POST /api/auth/register
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username.
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    /// Email address.
    #[validate(email)]
    pub email: String,
    /// Plaintext password (strength-checked in the service).
    pub password: String,
    /// Google account linked for Drive sharing.
    #[validate(email)]
    pub drive_email: Option<String>,
}

/// POST /api/auth/login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// POST /api/auth/refresh
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    /// A refresh token from a previous login.
    pub refresh_token: String,
}

/// POST /api/users/members
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMemberRequest {
    /// Desired username.
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    /// Email address.
    #[validate(email)]
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Role to assign.
    pub role: AccountRole,
    /// Google account linked for Drive sharing.
    #[validate(email)]
    pub drive_email: Option<String>,
}

/// PUT /api/users/members/{id}/role
#[derive(Debug, Clone, Deserialize)]
pub struct AssignRoleRequest {
    /// New role.
    pub role: AccountRole,
}

/// PUT /api/users/me
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// New email address.
    #[validate(email)]
    pub email: Option<String>,
    /// New linked Google account.
    #[validate(email)]
    pub drive_email: Option<String>,
}

/// PUT /api/users/me/password
#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    /// Current password.
    pub current_password: String,
    /// New password.
    pub new_password: String,
}

/// POST /api/drive/folders
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFolderRequest {
    /// Folder name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Parent folder id; the workspace root when absent.
    pub parent_id: Option<String>,
}

/// PUT /api/drive/items/{id}/rename
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RenameRequest {
    /// New item name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

/// POST /api/drive/items/{id}/share
#[derive(Debug, Clone, Deserialize)]
pub struct ShareItemRequest {
    /// Local account to share with.
    pub account_id: Option<Uuid>,
    /// Email to share with (used when `account_id` is absent).
    pub email: Option<String>,
    /// Role to grant; defaults to reader.
    pub role: Option<String>,
}

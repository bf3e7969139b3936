//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use driveport_entity::account::{Account, AccountRole};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Optional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Public view of an account.
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    /// Account id.
    pub id: Uuid,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Role.
    pub role: AccountRole,
    /// Whether the account is active.
    pub is_active: bool,
    /// Linked Google account, if any.
    pub drive_email: Option<String>,
    /// Creator account id, if any.
    pub created_by: Option<Uuid>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last successful login.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            role: account.role,
            is_active: account.is_active,
            drive_email: account.drive_email,
            created_by: account.created_by,
            created_at: account.created_at,
            last_login_at: account.last_login_at,
        }
    }
}

//! Account entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::AccountRole;

/// A registered account in the DrivePort directory.
///
/// `created_by` is the sole hierarchy edge: the accounts form a forest
/// through it, and manager/admin relationships are inferred transitively
/// from the edge plus the role.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    /// Unique account identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Email address, stored lowercase.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role in the hierarchy.
    pub role: AccountRole,
    /// Whether the account may log in.
    pub is_active: bool,
    /// Google account linked for Drive sharing, if different from `email`.
    pub drive_email: Option<String>,
    /// The account that created this one; `None` for roots of the forest.
    pub created_by: Option<Uuid>,
    /// Hash of the last issued OTP code.
    #[serde(skip_serializing)]
    pub otp_code_hash: Option<String>,
    /// When the last issued OTP code expires.
    pub otp_expires_at: Option<DateTime<Utc>>,
    /// Failed attempts against the current OTP code.
    pub otp_attempts: i32,
    /// OTP verification locked until this time.
    pub otp_locked_until: Option<DateTime<Utc>>,
    /// Number of consecutive failed login attempts.
    pub failed_login_attempts: i32,
    /// Account locked until this time (if locked).
    pub locked_until: Option<DateTime<Utc>>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// The email used when sharing Drive items with this account: the
    /// linked Google account when present, the primary email otherwise.
    pub fn sharing_email(&self) -> &str {
        self.drive_email.as_deref().unwrap_or(&self.email)
    }

    /// Whether the given email addresses this account (primary or linked),
    /// compared case-insensitively.
    pub fn matches_email(&self, email: &str) -> bool {
        let email = email.to_lowercase();
        self.email == email
            || self
                .drive_email
                .as_deref()
                .is_some_and(|drive| drive.eq_ignore_ascii_case(&email))
    }

    /// Check if the account is currently locked out of logging in.
    pub fn is_locked(&self) -> bool {
        self.locked_until.is_some_and(|until| Utc::now() < until)
    }

    /// Check if the account can log in right now.
    pub fn can_login(&self) -> bool {
        self.is_active && !self.is_locked()
    }
}

/// Data required to create a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccount {
    /// Desired username.
    pub username: String,
    /// Email address; lowercased before storage.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: AccountRole,
    /// Google account linked for Drive sharing (optional).
    pub drive_email: Option<String>,
    /// Creating account's id; `None` for self-registration.
    pub created_by: Option<Uuid>,
}

/// Data for updating an account's own profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfile {
    /// New email address.
    pub email: Option<String>,
    /// New linked Google account.
    pub drive_email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(email: &str, drive_email: Option<&str>) -> Account {
        Account {
            id: Uuid::new_v4(),
            username: "u".into(),
            email: email.into(),
            password_hash: "hash".into(),
            role: AccountRole::Client,
            is_active: true,
            drive_email: drive_email.map(Into::into),
            created_by: None,
            otp_code_hash: None,
            otp_expires_at: None,
            otp_attempts: 0,
            otp_locked_until: None,
            failed_login_attempts: 0,
            locked_until: None,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_sharing_email_prefers_drive_email() {
        let acct = account("a@x.com", Some("a@gmail.com"));
        assert_eq!(acct.sharing_email(), "a@gmail.com");

        let acct = account("a@x.com", None);
        assert_eq!(acct.sharing_email(), "a@x.com");
    }

    #[test]
    fn test_matches_email_either_address() {
        let acct = account("a@x.com", Some("a@gmail.com"));
        assert!(acct.matches_email("A@X.COM"));
        assert!(acct.matches_email("a@gmail.com"));
        assert!(!acct.matches_email("b@x.com"));
    }
}

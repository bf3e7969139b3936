//! Account repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use driveport_core::error::{AppError, ErrorKind};
use driveport_core::result::AppResult;
use driveport_entity::account::model::{CreateAccount, UpdateProfile};
use driveport_entity::account::{Account, AccountRole};

/// Repository for account CRUD and hierarchy queries.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    /// Create a new account repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an account by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find account by id", e)
            })
    }

    /// Find several accounts by primary key in one round trip.
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Account>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find accounts by ids", e)
            })
    }

    /// List every account, oldest first.
    pub async fn find_all(&self) -> AppResult<Vec<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list accounts", e))
    }

    /// Find an account by username (case-insensitive).
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find account by username", e)
            })
    }

    /// Find an account by primary or Drive-linked email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts WHERE email = LOWER($1) OR LOWER(drive_email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find account by email", e)
        })
    }

    /// Find accounts whose primary or Drive-linked email appears in the
    /// given list (case-insensitive).
    pub async fn find_by_emails(&self, emails: &[String]) -> AppResult<Vec<Account>> {
        if emails.is_empty() {
            return Ok(Vec::new());
        }
        let lowered: Vec<String> = emails.iter().map(|e| e.to_lowercase()).collect();
        sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts WHERE email = ANY($1) OR LOWER(drive_email) = ANY($1)",
        )
        .bind(&lowered)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find accounts by emails", e)
        })
    }

    /// List accounts created by the given account, optionally filtered by
    /// role. Unknown creator ids simply yield an empty list.
    pub async fn find_created_by(
        &self,
        creator_id: Uuid,
        role: Option<AccountRole>,
    ) -> AppResult<Vec<Account>> {
        match role {
            Some(role) => sqlx::query_as::<_, Account>(
                "SELECT * FROM accounts WHERE created_by = $1 AND role = $2 ORDER BY created_at",
            )
            .bind(creator_id)
            .bind(role)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list created accounts", e)
            }),
            None => sqlx::query_as::<_, Account>(
                "SELECT * FROM accounts WHERE created_by = $1 ORDER BY created_at",
            )
            .bind(creator_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list created accounts", e)
            }),
        }
    }

    /// Create a new account.
    pub async fn create(&self, data: &CreateAccount) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (id, username, email, password_hash, role, drive_email, created_by) \
             VALUES ($1, $2, LOWER($3), $4, $5, LOWER($6), $7) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.role)
        .bind(&data.drive_email)
        .bind(data.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::conflict("Username or email already taken")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create account", e),
        })
    }

    /// Update an account's own profile fields.
    pub async fn update_profile(&self, id: Uuid, data: &UpdateProfile) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "UPDATE accounts SET \
             email = COALESCE(LOWER($2), email), \
             drive_email = COALESCE(LOWER($3), drive_email), \
             updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.email)
        .bind(&data.drive_email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update profile", e))?
        .ok_or_else(|| AppError::not_found("Account not found"))
    }

    /// Reassign an account's role.
    pub async fn update_role(&self, id: Uuid, role: AccountRole) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "UPDATE accounts SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update role", e))?
        .ok_or_else(|| AppError::not_found("Account not found"))
    }

    /// Update an account's password hash.
    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE accounts SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update password", e)
            })?;
        Ok(())
    }

    /// Activate or deactivate an account.
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> AppResult<()> {
        sqlx::query("UPDATE accounts SET is_active = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(is_active)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to set active", e))?;
        Ok(())
    }

    /// Record a successful login: clears failure counters, stamps the time.
    pub async fn record_login_success(&self, id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE accounts SET failed_login_attempts = 0, locked_until = NULL, \
             last_login_at = NOW(), updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record login", e))?;
        Ok(())
    }

    /// Record a failed login attempt, locking the account once the
    /// threshold is crossed. The increment is atomic in SQL so concurrent
    /// failures cannot miss the lock.
    pub async fn record_login_failure(
        &self,
        id: Uuid,
        max_attempts: i32,
        locked_until: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE accounts SET \
             failed_login_attempts = failed_login_attempts + 1, \
             locked_until = CASE WHEN failed_login_attempts + 1 >= $2 THEN $3 ELSE locked_until END, \
             updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(max_attempts)
        .bind(locked_until)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record login failure", e)
        })?;
        Ok(())
    }

    /// Store a freshly issued OTP code hash, resetting the attempt counter.
    pub async fn store_otp(
        &self,
        id: Uuid,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE accounts SET otp_code_hash = $2, otp_expires_at = $3, otp_attempts = 0, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(code_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to store OTP", e))?;
        Ok(())
    }

    /// Clear all transient OTP state.
    pub async fn clear_otp(&self, id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE accounts SET otp_code_hash = NULL, otp_expires_at = NULL, otp_attempts = 0, \
             otp_locked_until = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clear OTP", e))?;
        Ok(())
    }

    /// Count a failed OTP attempt, locking OTP verification once the
    /// threshold is crossed.
    pub async fn record_otp_failure(
        &self,
        id: Uuid,
        max_attempts: i32,
        locked_until: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE accounts SET \
             otp_attempts = otp_attempts + 1, \
             otp_locked_until = CASE WHEN otp_attempts + 1 >= $2 THEN $3 ELSE otp_locked_until END, \
             updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(max_attempts)
        .bind(locked_until)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record OTP failure", e)
        })?;
        Ok(())
    }
}

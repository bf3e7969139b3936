//! User service: registration, login with lockout bookkeeping, and
//! hierarchy-driven member management.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use driveport_auth::jwt::{JwtDecoder, JwtEncoder, TokenPair};
use driveport_auth::password::{PasswordHasher, PasswordValidator};
use driveport_auth::rbac::policy::assert_can_create;
use driveport_auth::visibility::resolver::VisibilityResolver;
use driveport_core::config::auth::AuthConfig;
use driveport_core::error::AppError;
use driveport_core::result::AppResult;
use driveport_database::repositories::AccountRepository;
use driveport_entity::account::model::{CreateAccount, UpdateProfile};
use driveport_entity::account::{Account, AccountRole};

use crate::context::RequestContext;

/// Self-registration parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Google account linked for Drive sharing (optional).
    pub drive_email: Option<String>,
}

/// Member-creation parameters (privileged).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMemberRequest {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Role to assign.
    pub role: AccountRole,
    /// Google account linked for Drive sharing (optional).
    pub drive_email: Option<String>,
}

/// Successful login payload.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// The authenticated account.
    pub account: Account,
    /// Fresh token pair.
    pub tokens: TokenPair,
}

/// Registration, authentication, and member management.
#[derive(Clone)]
pub struct UserService {
    accounts: Arc<AccountRepository>,
    resolver: VisibilityResolver,
    hasher: Arc<PasswordHasher>,
    validator: PasswordValidator,
    encoder: Arc<JwtEncoder>,
    decoder: Arc<JwtDecoder>,
    config: AuthConfig,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish()
    }
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        accounts: Arc<AccountRepository>,
        resolver: VisibilityResolver,
        hasher: Arc<PasswordHasher>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
        config: AuthConfig,
    ) -> Self {
        let validator = PasswordValidator::new(&config);
        Self {
            accounts,
            resolver,
            hasher,
            validator,
            encoder,
            decoder,
            config,
        }
    }

    /// Self-registration: creates a client account with no creator.
    pub async fn register(&self, req: RegisterRequest) -> AppResult<Account> {
        self.validator.validate(&req.password, &req.username)?;
        let password_hash = self.hasher.hash_password(&req.password)?;

        let account = self
            .accounts
            .create(&CreateAccount {
                username: req.username,
                email: req.email,
                password_hash,
                role: AccountRole::Client,
                drive_email: req.drive_email,
                created_by: None,
            })
            .await?;

        info!(account_id = %account.id, "Account registered");
        Ok(account)
    }

    /// Verifies credentials and issues a token pair.
    ///
    /// Failed attempts are counted on the account row; crossing the
    /// threshold locks the account for the configured window.
    pub async fn login(&self, username_or_email: &str, password: &str) -> AppResult<LoginResult> {
        let account = match self.accounts.find_by_username(username_or_email).await? {
            Some(account) => Some(account),
            None => self.accounts.find_by_email(username_or_email).await?,
        };
        let Some(account) = account else {
            return Err(AppError::authentication("Invalid credentials"));
        };

        if !account.can_login() {
            warn!(account_id = %account.id, "Login rejected: account inactive or locked");
            return Err(AppError::authentication(
                "Account is locked or deactivated",
            ));
        }

        if !self.hasher.verify_password(password, &account.password_hash)? {
            let locked_until = Utc::now() + Duration::minutes(self.config.lockout_minutes);
            self.accounts
                .record_login_failure(account.id, self.config.max_login_attempts, locked_until)
                .await?;
            return Err(AppError::authentication("Invalid credentials"));
        }

        self.accounts.record_login_success(account.id).await?;
        let tokens = self.encoder.generate_token_pair(&account)?;

        info!(account_id = %account.id, "Login succeeded");
        Ok(LoginResult { account, tokens })
    }

    /// Issues a fresh access token from a valid refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<(String, chrono::DateTime<Utc>)> {
        let claims = self.decoder.decode_refresh_token(refresh_token)?;
        let account = self
            .accounts
            .find_by_id(claims.account_id())
            .await?
            .ok_or_else(|| AppError::authentication("Account no longer exists"))?;

        if !account.can_login() {
            return Err(AppError::authentication(
                "Account is locked or deactivated",
            ));
        }

        self.encoder.generate_access_token(&account)
    }

    /// Loads the account backing a token subject, rejecting inactive ones.
    pub async fn account_for_token(&self, account_id: Uuid) -> AppResult<Account> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| AppError::authentication("Account no longer exists"))?;
        if !account.is_active {
            return Err(AppError::authentication("Account is deactivated"));
        }
        Ok(account)
    }

    /// Creates a subordinate account under the caller.
    pub async fn create_member(
        &self,
        ctx: &RequestContext,
        req: CreateMemberRequest,
    ) -> AppResult<Account> {
        assert_can_create(ctx.role(), req.role)?;
        self.validator.validate(&req.password, &req.username)?;
        let password_hash = self.hasher.hash_password(&req.password)?;

        let account = self
            .accounts
            .create(&CreateAccount {
                username: req.username,
                email: req.email,
                password_hash,
                role: req.role,
                drive_email: req.drive_email,
                created_by: Some(ctx.account_id()),
            })
            .await?;

        info!(
            account_id = %account.id,
            role = %account.role,
            created_by = %ctx.account_id(),
            "Member created"
        );
        Ok(account)
    }

    /// Lists the accounts visible to the caller, per the same visibility
    /// rules that govern item listings.
    pub async fn list_members(&self, ctx: &RequestContext) -> AppResult<Vec<Account>> {
        match self.resolver.resolve(&ctx.account).await? {
            driveport_auth::visibility::resolver::Visibility::All => self.accounts.find_all().await,
            driveport_auth::visibility::resolver::Visibility::Uploaders(ids) => {
                let ids: Vec<Uuid> = ids.into_iter().collect();
                self.accounts.find_by_ids(&ids).await
            }
        }
    }

    /// Reassigns a managed member's role.
    ///
    /// The caller must be able to create the new role, and the target
    /// must be a direct subordinate (superadmin excepted).
    pub async fn assign_role(
        &self,
        ctx: &RequestContext,
        member_id: Uuid,
        role: AccountRole,
    ) -> AppResult<Account> {
        assert_can_create(ctx.role(), role)?;

        let member = self
            .accounts
            .find_by_id(member_id)
            .await?
            .ok_or_else(|| AppError::not_found("Member not found"))?;

        if !ctx.is_superadmin() && member.created_by != Some(ctx.account_id()) {
            return Err(AppError::forbidden(
                "You can only manage members you created",
            ));
        }

        self.accounts.update_role(member.id, role).await
    }

    /// Updates the caller's own profile.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        update: UpdateProfile,
    ) -> AppResult<Account> {
        self.accounts.update_profile(ctx.account_id(), &update).await
    }

    /// Changes the caller's password after verifying the current one.
    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        current: &str,
        new: &str,
    ) -> AppResult<()> {
        if !self
            .hasher
            .verify_password(current, &ctx.account.password_hash)?
        {
            return Err(AppError::authentication("Current password is incorrect"));
        }

        self.validator.validate(new, &ctx.account.username)?;
        let hash = self.hasher.hash_password(new)?;
        self.accounts.update_password(ctx.account_id(), &hash).await
    }
}

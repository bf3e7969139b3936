//! OAuth access-token acquisition for the delegated Drive account.
//!
//! Token *acquisition* (the consent flow that produced the refresh token)
//! happens outside this application; this module only exchanges the
//! configured refresh token for short-lived access tokens and caches them
//! until shortly before expiry.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use driveport_core::config::drive::DriveConfig;
use driveport_core::error::AppError;
use driveport_core::result::AppResult;

/// Safety margin subtracted from the reported token lifetime.
const EXPIRY_MARGIN_SECONDS: i64 = 60;

/// Provides bearer tokens for Drive API calls.
#[async_trait]
pub trait AccessTokenSource: Send + Sync + 'static {
    /// A currently valid access token.
    async fn access_token(&self) -> AppResult<String>;
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Exchanges the configured refresh token for access tokens.
pub struct OAuthTokenSource {
    http: reqwest::Client,
    config: DriveConfig,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for OAuthTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthTokenSource").finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

impl OAuthTokenSource {
    /// Creates a new token source.
    pub fn new(http: reqwest::Client, config: DriveConfig) -> Self {
        Self {
            http,
            config,
            cached: Mutex::new(None),
        }
    }

    async fn refresh(&self) -> AppResult<CachedToken> {
        let (client_id, client_secret, refresh_token) = match (
            &self.config.client_id,
            &self.config.client_secret,
            &self.config.refresh_token,
        ) {
            (Some(id), Some(secret), Some(token)) => (id, secret, token),
            _ => {
                return Err(AppError::not_configured(
                    "Google Drive credentials are not configured",
                ));
            }
        };

        let params = [
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Token refresh request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!(
                "Token refresh failed with {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream(format!("Malformed token response: {e}")))?;

        debug!(expires_in = token.expires_in, "Refreshed Drive access token");

        Ok(CachedToken {
            token: token.access_token,
            expires_at: Utc::now()
                + Duration::seconds((token.expires_in - EXPIRY_MARGIN_SECONDS).max(0)),
        })
    }
}

#[async_trait]
impl AccessTokenSource for OAuthTokenSource {
    async fn access_token(&self) -> AppResult<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if Utc::now() < token.expires_at {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.refresh().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

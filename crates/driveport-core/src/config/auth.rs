//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication and token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign JWTs.
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub jwt_access_ttl_minutes: u64,
    /// Refresh token TTL in hours.
    #[serde(default = "default_refresh_ttl")]
    pub jwt_refresh_ttl_hours: u64,
    /// Minimum password length.
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
    /// Failed login attempts before temporary lockout.
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: i32,
    /// Lockout duration in minutes after too many failed logins.
    #[serde(default = "default_lockout_minutes")]
    pub lockout_minutes: i64,
    /// OTP code validity window in minutes.
    #[serde(default = "default_otp_ttl")]
    pub otp_ttl_minutes: i64,
    /// Failed OTP attempts before the code is invalidated.
    #[serde(default = "default_max_otp_attempts")]
    pub max_otp_attempts: i32,
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    72
}

fn default_min_password_length() -> usize {
    10
}

fn default_max_login_attempts() -> i32 {
    5
}

fn default_lockout_minutes() -> i64 {
    15
}

fn default_otp_ttl() -> i64 {
    10
}

fn default_max_otp_attempts() -> i32 {
    3
}

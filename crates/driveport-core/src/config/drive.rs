//! Google Drive integration configuration.

use serde::{Deserialize, Serialize};

/// Google Drive API settings.
///
/// The OAuth client credentials are optional: when any of them is absent
/// the Drive client reports `NOT_CONFIGURED` instead of attempting calls,
/// so the rest of the application still starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Base URL of the Drive REST API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Base URL for multipart uploads.
    #[serde(default = "default_upload_base_url")]
    pub upload_base_url: String,
    /// OAuth token endpoint.
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// OAuth client id.
    #[serde(default)]
    pub client_id: Option<String>,
    /// OAuth client secret.
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Long-lived refresh token for the delegated Drive account.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Drive folder id used as the workspace root.
    #[serde(default = "default_root_folder")]
    pub root_folder_id: String,
    /// Upstream request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl DriveConfig {
    /// Whether all OAuth credentials are present.
    pub fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some() && self.refresh_token.is_some()
    }
}

fn default_api_base_url() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_upload_base_url() -> String {
    "https://www.googleapis.com/upload/drive/v3".to_string()
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_root_folder() -> String {
    "root".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_configured() {
        let mut config = DriveConfig {
            api_base_url: default_api_base_url(),
            upload_base_url: default_upload_base_url(),
            token_url: default_token_url(),
            client_id: Some("id".into()),
            client_secret: Some("secret".into()),
            refresh_token: Some("token".into()),
            root_folder_id: default_root_folder(),
            request_timeout_seconds: 30,
        };
        assert!(config.is_configured());

        config.refresh_token = None;
        assert!(!config.is_configured());
    }
}

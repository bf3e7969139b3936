//! Request context carrying the authenticated account.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use driveport_entity::account::{Account, AccountRole};

/// Context for the current authenticated request.
///
/// Extracted by the HTTP layer and passed into service methods so that
/// every operation knows *who* is acting. Carries the full account row —
/// the authorization core needs the role, the `created_by` edge, and the
/// sharing email, not just the id from the token claims.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The authenticated account.
    pub account: Account,
    /// IP address of the request origin.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(account: Account, ip_address: String, user_agent: Option<String>) -> Self {
        Self {
            account,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    /// The acting account's id.
    pub fn account_id(&self) -> Uuid {
        self.account.id
    }

    /// The acting account's role.
    pub fn role(&self) -> AccountRole {
        self.account.role
    }

    /// Whether the current account is the superadmin.
    pub fn is_superadmin(&self) -> bool {
        self.account.role.is_superadmin()
    }
}

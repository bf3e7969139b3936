//! Account role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles in the organizational hierarchy.
///
/// The canonical closed set is `superadmin > admin > manager > client`;
/// the hierarchy itself is carried by each account's `created_by`
/// reference, the role only selects the visibility algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    /// Sees every item; manages the whole directory.
    Superadmin,
    /// Sees its own items plus those of its managers and their clients.
    Admin,
    /// Sees its own items plus those of its direct reports.
    Manager,
    /// Sees its own items plus its manager's.
    Client,
}

impl AccountRole {
    /// Return the privilege level (higher = more privileged).
    pub fn privilege_level(&self) -> u8 {
        match self {
            Self::Superadmin => 4,
            Self::Admin => 3,
            Self::Manager => 2,
            Self::Client => 1,
        }
    }

    /// Check if this role has at least the given role's privileges.
    pub fn has_at_least(&self, other: &AccountRole) -> bool {
        self.privilege_level() >= other.privilege_level()
    }

    /// Check if this role is the superadmin.
    pub fn is_superadmin(&self) -> bool {
        matches!(self, Self::Superadmin)
    }

    /// Check if this role may manage subordinate accounts at all.
    pub fn is_manager_or_above(&self) -> bool {
        self.has_at_least(&Self::Manager)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Superadmin => "superadmin",
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountRole {
    type Err = driveport_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "superadmin" => Ok(Self::Superadmin),
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "client" => Ok(Self::Client),
            _ => Err(driveport_core::AppError::validation(format!(
                "Invalid account role: '{s}'. Expected one of: superadmin, admin, manager, client"
            ))),
        }
    }
}

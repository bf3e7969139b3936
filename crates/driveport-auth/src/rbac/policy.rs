//! Member-creation policy: which roles an account may create.

use driveport_core::error::AppError;
use driveport_core::result::AppResult;
use driveport_entity::account::AccountRole;

/// The roles an account with the given role may create (and assign).
pub fn creatable_roles(creator: AccountRole) -> &'static [AccountRole] {
    match creator {
        AccountRole::Superadmin => &[
            AccountRole::Admin,
            AccountRole::Manager,
            AccountRole::Client,
        ],
        AccountRole::Admin => &[AccountRole::Manager, AccountRole::Client],
        AccountRole::Manager => &[AccountRole::Client],
        AccountRole::Client => &[],
    }
}

/// Whether the creator role may create an account with the new role.
pub fn can_create(creator: AccountRole, new_role: AccountRole) -> bool {
    creatable_roles(creator).contains(&new_role)
}

/// Asserts the creation is allowed, with a descriptive denial.
pub fn assert_can_create(creator: AccountRole, new_role: AccountRole) -> AppResult<()> {
    if can_create(creator, new_role) {
        Ok(())
    } else {
        Err(AppError::forbidden(format!(
            "A {creator} account cannot create {new_role} accounts"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_matrix() {
        assert!(can_create(AccountRole::Superadmin, AccountRole::Admin));
        assert!(can_create(AccountRole::Admin, AccountRole::Manager));
        assert!(can_create(AccountRole::Admin, AccountRole::Client));
        assert!(can_create(AccountRole::Manager, AccountRole::Client));

        assert!(!can_create(AccountRole::Admin, AccountRole::Admin));
        assert!(!can_create(AccountRole::Manager, AccountRole::Manager));
        assert!(!can_create(AccountRole::Client, AccountRole::Client));
        assert!(!can_create(
            AccountRole::Superadmin,
            AccountRole::Superadmin
        ));
    }

    #[test]
    fn test_assert_can_create_denies_with_forbidden() {
        let err = assert_can_create(AccountRole::Client, AccountRole::Client).unwrap_err();
        assert!(err.is_forbidden());
    }
}

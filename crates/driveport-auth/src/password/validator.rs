//! Password strength validation.

use driveport_core::config::auth::AuthConfig;
use driveport_core::error::AppError;

/// Minimum acceptable zxcvbn strength score.
const MIN_SCORE: zxcvbn::Score = zxcvbn::Score::Three;

/// Validates candidate passwords against length and strength rules.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.min_password_length,
        }
    }

    /// Checks a candidate password, using the username as a dictionary
    /// input so passwords derived from it score poorly.
    pub fn validate(&self, password: &str, username: &str) -> Result<(), AppError> {
        if password.len() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                self.min_length
            )));
        }

        let estimate = zxcvbn::zxcvbn(password, &[username]);
        if estimate.score() < MIN_SCORE {
            return Err(AppError::validation(
                "Password is too weak; use a longer or less predictable phrase",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> PasswordValidator {
        PasswordValidator { min_length: 10 }
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(validator().validate("short", "alice").is_err());
    }

    #[test]
    fn test_weak_password_rejected() {
        assert!(validator().validate("aaaaaaaaaaaa", "alice").is_err());
    }

    #[test]
    fn test_strong_password_accepted() {
        assert!(
            validator()
                .validate("plum-Torch-29-gravel", "alice")
                .is_ok()
        );
    }
}

//! Password policy enforcement for new passwords.

use filevault_core::error::AppError;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 4;

/// Validates new passwords against the length policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length.
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a validator with the default minimum length.
    pub fn new() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
        }
    }

    /// Returns `Ok(())` if the password is long enough.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::bad_request(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }
        Ok(())
    }
}

impl Default for PasswordValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filevault_core::error::ErrorKind;

    #[test]
    fn test_length_policy() {
        let validator = PasswordValidator::new();
        assert_eq!(
            validator.validate("abc").unwrap_err().kind,
            ErrorKind::BadRequest
        );
        assert!(validator.validate("abcd").is_ok());
        // Counted in characters, not bytes.
        assert!(validator.validate("çãõ").is_err());
    }
}

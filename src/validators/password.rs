use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Password validation rules.
///
/// The default policy accepts 8 to 128 characters with no further
/// requirements; [`PasswordPolicy::strict`] adds character-class checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordPolicy {
    /// Minimum password length (default: 8)
    pub min_length: usize,
    /// Maximum password length (default: 128)
    pub max_length: usize,
    /// Require at least one uppercase letter
    pub require_uppercase: bool,
    /// Require at least one lowercase letter
    pub require_lowercase: bool,
    /// Require at least one digit
    pub require_digit: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
        }
    }
}

impl PasswordPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 12+ characters with mixed case and a digit.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            min_length: 12,
            max_length: 128,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
        }
    }

    /// Sets the minimum password length.
    #[must_use]
    pub fn min(mut self, len: usize) -> Self {
        self.min_length = len;
        self
    }

    /// Requires at least one uppercase letter.
    #[must_use]
    pub fn require_uppercase(mut self) -> Self {
        self.require_uppercase = true;
        self
    }

    /// Requires at least one lowercase letter.
    #[must_use]
    pub fn require_lowercase(mut self) -> Self {
        self.require_lowercase = true;
        self
    }

    /// Requires at least one digit.
    #[must_use]
    pub fn require_digit(mut self) -> Self {
        self.require_digit = true;
        self
    }

    /// # Errors
    ///
    /// Returns a `ValidationError` naming the first requirement the
    /// password fails.
    pub fn validate(&self, password: &str) -> Result<(), ValidationError> {
        if password.is_empty() {
            return Err(ValidationError::PasswordEmpty);
        }

        if password.len() < self.min_length {
            return Err(ValidationError::PasswordTooShort(self.min_length));
        }

        if password.len() > self.max_length {
            return Err(ValidationError::PasswordTooLong(self.max_length));
        }

        if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            return Err(ValidationError::PasswordMissingUppercase);
        }

        if self.require_lowercase && !password.chars().any(char::is_lowercase) {
            return Err(ValidationError::PasswordMissingLowercase);
        }

        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(ValidationError::PasswordMissingDigit);
        }

        Ok(())
    }
}

/// Validates with the default policy (8-128 characters).
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    PasswordPolicy::default().validate(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = PasswordPolicy::default();
        assert!(policy.validate("password123").is_ok());
        assert_eq!(
            policy.validate("").unwrap_err(),
            ValidationError::PasswordEmpty
        );
        assert_eq!(
            policy.validate("short").unwrap_err(),
            ValidationError::PasswordTooShort(8)
        );
        assert_eq!(
            policy.validate(&"a".repeat(129)).unwrap_err(),
            ValidationError::PasswordTooLong(128)
        );
    }

    #[test]
    fn test_strict_policy() {
        let policy = PasswordPolicy::strict();

        assert!(policy.validate("MyPassw0rd123").is_ok());
        assert_eq!(
            policy.validate("mypassw0rd123").unwrap_err(),
            ValidationError::PasswordMissingUppercase
        );
        assert_eq!(
            policy.validate("MYPASSW0RD123").unwrap_err(),
            ValidationError::PasswordMissingLowercase
        );
        assert_eq!(
            policy.validate("MyPasswordAbcd").unwrap_err(),
            ValidationError::PasswordMissingDigit
        );
    }

    #[test]
    fn test_builder() {
        let policy = PasswordPolicy::new().min(10).require_digit();

        assert!(policy.validate("Password12").is_ok());
        assert_eq!(
            policy.validate("Passwordab").unwrap_err(),
            ValidationError::PasswordMissingDigit
        );
    }
}

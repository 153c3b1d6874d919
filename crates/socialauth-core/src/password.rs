use bcrypt::{DEFAULT_COST, hash, verify};
use validator::ValidationError;

use crate::errors::AppError;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::internal_error(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::internal_error(format!("Failed to verify password: {}", e)))
}

/// Password strength rule used by registration, password change and reset.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let length = password.chars().count();
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        return Err(ValidationError::new("password_length").with_message(
            format!(
                "Password must be between {} and {} characters",
                MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
            )
            .into(),
        ));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("password_digit")
            .with_message("Password must contain at least one digit".into()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hashed = hash_password("abc12345").unwrap();
        assert_ne!(hashed, "abc12345");
        assert!(verify_password("abc12345", &hashed).unwrap());
        assert!(!verify_password("abc12346", &hashed).unwrap());
    }

    #[test]
    fn verify_against_garbage_hash_is_an_error() {
        assert!(verify_password("abc12345", "not-a-bcrypt-hash").is_err());
    }

    #[test]
    fn strength_rules() {
        assert!(validate_password_strength("abc12345").is_ok());
        assert!(validate_password_strength("abc1234").is_err());
        assert!(validate_password_strength("abcdefgh").is_err());
        assert!(validate_password_strength(&"a1".repeat(65)).is_err());
    }
}

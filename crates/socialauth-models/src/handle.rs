//! Handle (username) rules.
//!
//! A handle is up to 150 characters of letters, digits and `@ . + - _`.
//! Social sign-ups derive one from the display name.

use validator::ValidationError;

pub const MAX_HANDLE_LENGTH: usize = 150;

fn is_handle_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

/// Lower-cases `full_name`, removes whitespace and anything outside the
/// handle alphabet. Falls back to the local part of `email` when nothing
/// is left.
pub fn derive_handle_base(full_name: &str, email: &str) -> String {
    let from_name = sanitize(full_name);
    if !from_name.is_empty() {
        return from_name;
    }

    let local = email.split('@').next().unwrap_or_default();
    let from_email = sanitize(local);
    if from_email.is_empty() {
        "user".to_string()
    } else {
        from_email
    }
}

fn sanitize(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && is_handle_char(*c))
        .take(MAX_HANDLE_LENGTH - 10)
        .collect()
}

/// `base` for attempt 0, `base1`, `base2`, ... afterwards.
pub fn handle_candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{}{}", base, attempt)
    }
}

pub fn validate_handle(handle: &str) -> Result<(), ValidationError> {
    if handle.is_empty() || handle.chars().count() > MAX_HANDLE_LENGTH {
        return Err(ValidationError::new("username_length")
            .with_message("Username must be between 1 and 150 characters".into()));
    }
    if !handle.chars().all(is_handle_char) {
        return Err(ValidationError::new("username_chars").with_message(
            "Username may only contain letters, digits and @/./+/-/_ characters".into(),
        ));
    }
    Ok(())
}

/// 10 to 15 digits with an optional leading `+`.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let valid = (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("phone").with_message(
            "Phone number must be 10 to 15 digits, optionally prefixed with +".into(),
        ))
    }
}

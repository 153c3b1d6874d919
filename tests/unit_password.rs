use socialauth_core::{hash_password, validate_password_strength, verify_password};

#[test]
fn test_hash_generates_unique_hashes() {
    let password = "samepass1";
    let hash1 = hash_password(password).unwrap();
    let hash2 = hash_password(password).unwrap();

    assert_ne!(hash1, hash2);
    assert!(verify_password(password, &hash1).unwrap());
    assert!(verify_password(password, &hash2).unwrap());
}

#[test]
fn test_verify_password_incorrect() {
    let hash = hash_password("correct123").unwrap();

    let result = verify_password("wrong1234", &hash);

    assert!(result.is_ok());
    assert!(!result.unwrap());
}

#[test]
fn test_verify_case_sensitive() {
    let hash = hash_password("Password123").unwrap();

    assert!(!verify_password("password123", &hash).unwrap());
    assert!(!verify_password("PASSWORD123", &hash).unwrap());
}

#[test]
fn test_verify_password_invalid_hash() {
    assert!(verify_password("testpass1", "not_a_valid_bcrypt_hash").is_err());
}

#[test]
fn test_social_placeholder_secret_round_trips() {
    // social accounts store the shared placeholder secret as their hash
    let secret = "a-long-shared-social-secret";
    let hash = hash_password(secret).unwrap();

    assert!(verify_password(secret, &hash).unwrap());
    assert!(!verify_password("", &hash).unwrap());
}

#[test]
fn test_hash_unicode_characters() {
    let password = "пароль密码1";
    let hash = hash_password(password).unwrap();

    assert!(verify_password(password, &hash).unwrap());
}

#[test]
fn test_strength_boundaries() {
    assert!(validate_password_strength("abcdefg1").is_ok());
    assert!(validate_password_strength("abcdef1").is_err());
    assert!(validate_password_strength(&format!("{}1", "a".repeat(127))).is_ok());
    assert!(validate_password_strength(&format!("{}1", "a".repeat(128))).is_err());
}

#[test]
fn test_strength_requires_digit() {
    let err = validate_password_strength("no-digits-here").unwrap_err();

    assert_eq!(err.code, "password_digit");
    assert_eq!(
        err.message.as_deref(),
        Some("Password must contain at least one digit")
    );
}

#[test]
fn test_strength_counts_characters_not_bytes() {
    // eight characters, more than eight bytes
    assert!(validate_password_strength("ééééééé1").is_ok());
    assert!(validate_password_strength("éééééé1").is_err());
}

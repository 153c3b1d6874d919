//! Stateless password reset links.
//!
//! A link carries two path segments:
//!
//! - `uidb64`: the account id, URL-safe base64 without padding
//! - `token`: `<timestamp base36>-<hex HMAC-SHA256, first 16 bytes>`
//!
//! The MAC covers the account id, the current password hash and the
//! timestamp, so changing the password invalidates every outstanding link.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use socialauth_config::JwtConfig;
use socialauth_core::AppError;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_BYTES: usize = 16;

pub const RESET_LINK_INVALID: &str = "The reset link is invalid";
pub const RESET_LINK_EXPIRED: &str = "The reset link has expired";

pub fn encode_uid(id: Uuid) -> String {
    URL_SAFE_NO_PAD.encode(id.to_string())
}

pub fn decode_uid(uidb64: &str) -> Option<Uuid> {
    let bytes = URL_SAFE_NO_PAD.decode(uidb64.trim_end_matches('=')).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    Uuid::parse_str(&text).ok()
}

fn mac(
    secret: &str,
    account_id: Uuid,
    password_hash: &str,
    timestamp: u64,
) -> Result<HmacSha256, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::internal_error(format!("Invalid reset token key: {}", e)))?;
    mac.update(account_id.to_string().as_bytes());
    mac.update(password_hash.as_bytes());
    mac.update(timestamp.to_string().as_bytes());
    Ok(mac)
}

pub fn make_reset_token(
    account_id: Uuid,
    password_hash: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    make_reset_token_at(
        account_id,
        password_hash,
        &jwt_config.secret,
        Utc::now().timestamp().max(0) as u64,
    )
}

fn make_reset_token_at(
    account_id: Uuid,
    password_hash: &str,
    secret: &str,
    timestamp: u64,
) -> Result<String, AppError> {
    let digest = mac(secret, account_id, password_hash, timestamp)?
        .finalize()
        .into_bytes();
    Ok(format!(
        "{}-{}",
        to_base36(timestamp),
        hex::encode(&digest[..SIGNATURE_BYTES])
    ))
}

/// Checks a reset token against the account's current password hash.
///
/// The signature is checked before the age, so a forged token is always
/// reported as invalid regardless of its timestamp.
pub fn check_reset_token(
    account_id: Uuid,
    password_hash: &str,
    token: &str,
    jwt_config: &JwtConfig,
) -> Result<(), AppError> {
    let invalid = || AppError::token_invalid(RESET_LINK_INVALID);

    let (ts_part, sig_part) = token.split_once('-').ok_or_else(invalid)?;
    let timestamp = from_base36(ts_part).ok_or_else(invalid)?;
    let signature = hex::decode(sig_part).map_err(|_| invalid())?;
    if signature.len() != SIGNATURE_BYTES {
        return Err(invalid());
    }

    mac(&jwt_config.secret, account_id, password_hash, timestamp)?
        .verify_truncated_left(&signature)
        .map_err(|_| invalid())?;

    let now = Utc::now().timestamp().max(0) as u64;
    if now.saturating_sub(timestamp) > jwt_config.password_reset_expiry.max(0) as u64 {
        return Err(AppError::token_expired(RESET_LINK_EXPIRED));
    }

    Ok(())
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

fn from_base36(value: &str) -> Option<u64> {
    if value.is_empty() || value.len() > 13 {
        return None;
    }
    u64::from_str_radix(value, 36).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use socialauth_core::ErrorKind;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "reset-secret".to_string(),
            ..JwtConfig::default()
        }
    }

    #[test]
    fn base36_round_trip() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(from_base36(&to_base36(1_700_000_000)), Some(1_700_000_000));
        assert_eq!(from_base36("not base36!"), None);
    }

    #[test]
    fn uid_round_trip_has_no_padding() {
        let id = Uuid::new_v4();
        let encoded = encode_uid(id);
        assert!(!encoded.contains('='));
        assert_eq!(decode_uid(&encoded), Some(id));
        assert_eq!(decode_uid("garbage"), None);
    }

    #[test]
    fn fresh_token_is_accepted() {
        let id = Uuid::new_v4();
        let token = make_reset_token(id, "hash-1", &config()).unwrap();
        assert!(check_reset_token(id, "hash-1", &token, &config()).is_ok());
    }

    #[test]
    fn password_change_invalidates_token() {
        let id = Uuid::new_v4();
        let token = make_reset_token(id, "hash-1", &config()).unwrap();

        let err = check_reset_token(id, "hash-2", &token, &config()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenInvalid);
    }

    #[test]
    fn token_for_another_account_is_invalid() {
        let token = make_reset_token(Uuid::new_v4(), "hash-1", &config()).unwrap();
        let err = check_reset_token(Uuid::new_v4(), "hash-1", &token, &config()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenInvalid);
    }

    #[test]
    fn old_genuine_token_is_expired() {
        let id = Uuid::new_v4();
        let issued = Utc::now().timestamp() as u64 - 7200;
        let token = make_reset_token_at(id, "hash-1", "reset-secret", issued).unwrap();

        let err = check_reset_token(id, "hash-1", &token, &config()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenExpired);
    }

    #[test]
    fn old_tampered_token_is_invalid_not_expired() {
        let id = Uuid::new_v4();
        let issued = Utc::now().timestamp() as u64 - 7200;
        let token = make_reset_token_at(id, "hash-1", "other-secret", issued).unwrap();

        let err = check_reset_token(id, "hash-1", &token, &config()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenInvalid);
    }

    #[test]
    fn malformed_tokens_are_invalid() {
        let id = Uuid::new_v4();
        for token in ["", "nodash", "abc-zz", "abc-00ff"] {
            let err = check_reset_token(id, "hash-1", token, &config()).unwrap_err();
            assert_eq!(err.kind, ErrorKind::TokenInvalid, "token {token:?}");
        }
    }
}

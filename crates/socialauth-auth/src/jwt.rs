//! JWT creation and verification.
//!
//! All tokens are HS256 and signed with `JWT_SECRET`. Each carries a
//! `token_type` claim and is only accepted where that type is expected:
//!
//! - **Access tokens** authenticate API calls (`Authorization: Bearer`)
//! - **Refresh tokens** are exchanged once for a new pair
//! - **Email verification tokens** are embedded in activation links
//!
//! ```ignore
//! use socialauth_auth::{create_token_pair, verify_token};
//! use socialauth_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let pair = create_token_pair(account_id, "ana@x.com", &config)?;
//! let claims = verify_token(&pair.access, &config)?;
//! ```

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use socialauth_config::JwtConfig;
use socialauth_core::AppError;

use crate::claims::{Claims, EmailVerificationClaims, TokenPair, TokenType};

pub const ACTIVATION_EXPIRED: &str = "Activation token expired. Please request new one.";
pub const ACTIVATION_INVALID: &str = "Activation token is invalid. Please request new one.";

fn now() -> usize {
    Utc::now().timestamp() as usize
}

fn sign<T: Serialize>(claims: &T, jwt_config: &JwtConfig) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

fn decode_claims<T: DeserializeOwned>(
    token: &str,
    jwt_config: &JwtConfig,
) -> Result<T, jsonwebtoken::errors::Error> {
    decode::<T>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

fn session_claims(
    user_id: Uuid,
    email: &str,
    token_type: TokenType,
    lifetime: i64,
) -> Claims {
    let iat = now();
    Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        token_type,
        exp: iat + lifetime.max(0) as usize,
        iat,
        jti: Uuid::new_v4().simple().to_string(),
    }
}

pub fn create_access_token(
    user_id: Uuid,
    email: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let claims = session_claims(
        user_id,
        email,
        TokenType::Access,
        jwt_config.access_token_expiry,
    );
    sign(&claims, jwt_config)
}

pub fn create_refresh_token(
    user_id: Uuid,
    email: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let claims = session_claims(
        user_id,
        email,
        TokenType::Refresh,
        jwt_config.refresh_token_expiry,
    );
    sign(&claims, jwt_config)
}

pub fn create_token_pair(
    user_id: Uuid,
    email: &str,
    jwt_config: &JwtConfig,
) -> Result<TokenPair, AppError> {
    Ok(TokenPair {
        access: create_access_token(user_id, email, jwt_config)?,
        refresh: create_refresh_token(user_id, email, jwt_config)?,
    })
}

/// Verifies an access token.
///
/// # Errors
///
/// Returns an unauthorized error if the token is malformed, expired, signed
/// with another secret, or is not an access token.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    let claims: Claims = decode_claims(token, jwt_config)
        .map_err(|_| AppError::unauthorized("Invalid or expired token"))?;

    if claims.token_type != TokenType::Access {
        return Err(AppError::unauthorized("Invalid or expired token"));
    }

    Ok(claims)
}

pub fn verify_refresh_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    let claims: Claims = decode_claims(token, jwt_config)
        .map_err(|_| AppError::unauthorized("Token is invalid or expired"))?;

    if claims.token_type != TokenType::Refresh {
        return Err(AppError::unauthorized("Token has wrong type"));
    }

    Ok(claims)
}

pub fn create_email_verification_token(
    user_id: Uuid,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let iat = now();
    let claims = EmailVerificationClaims {
        user_id: user_id.to_string(),
        token_type: TokenType::EmailVerification,
        exp: iat + jwt_config.email_verification_expiry.max(0) as usize,
        iat,
    };
    sign(&claims, jwt_config)
}

/// Verifies an activation token and returns the account it names.
///
/// Expiry is reported separately from every other failure so the client can
/// offer to resend the link.
pub fn verify_email_verification_token(
    token: &str,
    jwt_config: &JwtConfig,
) -> Result<Uuid, AppError> {
    let claims: EmailVerificationClaims =
        decode_claims(token, jwt_config).map_err(|e| match e.kind() {
            JwtErrorKind::ExpiredSignature => AppError::token_expired(ACTIVATION_EXPIRED),
            _ => AppError::token_invalid(ACTIVATION_INVALID),
        })?;

    if claims.token_type != TokenType::EmailVerification {
        return Err(AppError::token_invalid(ACTIVATION_INVALID));
    }

    Uuid::parse_str(&claims.user_id).map_err(|_| AppError::token_invalid(ACTIVATION_INVALID))
}

#[cfg(test)]
mod tests {
    use super::*;
    use socialauth_core::ErrorKind;

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            ..JwtConfig::default()
        }
    }

    #[test]
    fn test_verify_token_success() {
        let config = get_test_jwt_config();
        let user_id = Uuid::new_v4();

        let token = create_access_token(user_id, "test@example.com", &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn test_verify_token_invalid() {
        let config = get_test_jwt_config();
        assert!(verify_token("invalid-token", &config).is_err());
    }

    #[test]
    fn test_verify_token_wrong_secret() {
        let config = get_test_jwt_config();
        let token = create_access_token(Uuid::new_v4(), "test@example.com", &config).unwrap();

        let wrong_config = JwtConfig {
            secret: "different-secret-key-at-least-32-characters".to_string(),
            ..JwtConfig::default()
        };

        assert!(verify_token(&token, &wrong_config).is_err());
    }

    #[test]
    fn test_refresh_token_rejected_as_access_token() {
        let config = get_test_jwt_config();
        let refresh = create_refresh_token(Uuid::new_v4(), "test@example.com", &config).unwrap();

        let err = verify_token(&refresh, &config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::AuthenticationFailed);
    }

    #[test]
    fn test_access_token_rejected_as_refresh_token() {
        let config = get_test_jwt_config();
        let access = create_access_token(Uuid::new_v4(), "test@example.com", &config).unwrap();

        assert!(verify_refresh_token(&access, &config).is_err());
    }

    #[test]
    fn test_pair_has_distinct_jtis_and_longer_refresh() {
        let config = get_test_jwt_config();
        let pair = create_token_pair(Uuid::new_v4(), "test@example.com", &config).unwrap();

        let access = verify_token(&pair.access, &config).unwrap();
        let refresh = verify_refresh_token(&pair.refresh, &config).unwrap();

        assert_ne!(access.jti, refresh.jti);
        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn test_email_verification_round() {
        let config = get_test_jwt_config();
        let user_id = Uuid::new_v4();

        let token = create_email_verification_token(user_id, &config).unwrap();
        assert_eq!(verify_email_verification_token(&token, &config).unwrap(), user_id);
    }

    #[test]
    fn test_expired_email_verification_token() {
        let config = get_test_jwt_config();
        let iat = now() - 7200;
        let claims = EmailVerificationClaims {
            user_id: Uuid::new_v4().to_string(),
            token_type: TokenType::EmailVerification,
            exp: iat + 3600,
            iat,
        };
        let token = sign(&claims, &config).unwrap();

        let err = verify_email_verification_token(&token, &config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenExpired);
        assert_eq!(err.error.to_string(), ACTIVATION_EXPIRED);
    }

    #[test]
    fn test_tampered_email_verification_token() {
        let config = get_test_jwt_config();
        let mut token = create_email_verification_token(Uuid::new_v4(), &config).unwrap();
        token.push('x');

        let err = verify_email_verification_token(&token, &config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenInvalid);
    }

    #[test]
    fn test_access_token_is_not_an_activation_token() {
        let config = get_test_jwt_config();
        let access = create_access_token(Uuid::new_v4(), "test@example.com", &config).unwrap();

        let err = verify_email_verification_token(&access, &config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenInvalid);
    }
}

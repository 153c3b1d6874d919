//! JWT claim structures.
//!
//! - [`Claims`]: access and refresh tokens, distinguished by [`TokenType`]
//! - [`EmailVerificationClaims`]: the token embedded in verification links

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
    EmailVerification,
}

/// Claims carried by access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Account ID (subject claim)
    pub sub: String,
    pub email: String,
    pub token_type: TokenType,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
    /// Unique token identifier, used to blacklist consumed refresh tokens
    pub jti: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailVerificationClaims {
    pub user_id: String,
    pub token_type: TokenType,
    pub exp: usize,
    pub iat: usize,
}

/// The session handed back by every successful login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_type_serializes_snake_case() {
        let json = serde_json::to_string(&TokenType::EmailVerification).unwrap();
        assert_eq!(json, r#""email_verification""#);
    }

    #[test]
    fn test_claims_deserialize() {
        let json = r#"{"sub":"user-id-456","email":"user@test.com","token_type":"refresh","exp":9999999999,"iat":9999999900,"jti":"abc"}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.sub, "user-id-456");
        assert_eq!(claims.token_type, TokenType::Refresh);
        assert_eq!(claims.jti, "abc");
    }

    #[test]
    fn test_verification_claims_reject_session_shape() {
        let json = r#"{"sub":"user-id-456","email":"user@test.com","token_type":"access","exp":9999999999,"iat":9999999900,"jti":"abc"}"#;
        assert!(serde_json::from_str::<EmailVerificationClaims>(json).is_err());
    }
}

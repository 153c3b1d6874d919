//! Request bodies for the `/social` endpoints.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Google ID token or Facebook user access token.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SocialTokenRequest {
    #[validate(length(min = 1, message = "auth_token is required"))]
    pub auth_token: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TwitterLoginRequest {
    #[validate(length(min = 1, message = "oauth_token is required"))]
    pub oauth_token: String,
    #[validate(length(min = 1, message = "oauth_verifier is required"))]
    pub oauth_verifier: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_is_rejected() {
        let req = SocialTokenRequest {
            auth_token: String::new(),
        };
        assert!(req.validate().is_err());
    }
}

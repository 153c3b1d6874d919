use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use socialauth_models::{
    AuthProvider, ChangePasswordRequest, CurrentUserResponse, LoginRequest, MessageResponse,
    RefreshTokenRequest, RegisterRequest, RegisterResponse, ResetCompleteRequest,
    ResetEmailRequest, SocialTokenRequest, TokenPair, TwitterLoginRequest,
    UpdateCurrentUserRequest,
};

use crate::modules::users::controller::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::users::controller::register,
        crate::modules::users::controller::obtain_token,
        crate::modules::users::controller::refresh_token,
        crate::modules::users::controller::change_password,
        crate::modules::users::controller::verify_email,
        crate::modules::users::controller::request_reset_email,
        crate::modules::users::controller::check_reset_link,
        crate::modules::users::controller::complete_password_reset,
        crate::modules::users::controller::get_current_user,
        crate::modules::users::controller::update_current_user,
        crate::modules::social::controller::google_login,
        crate::modules::social::controller::facebook_login,
        crate::modules::social::controller::twitter_login,
        crate::modules::social::controller::twitter_request_token,
    ),
    components(
        schemas(
            AuthProvider,
            RegisterRequest,
            RegisterResponse,
            LoginRequest,
            RefreshTokenRequest,
            TokenPair,
            ChangePasswordRequest,
            ResetEmailRequest,
            ResetCompleteRequest,
            UpdateCurrentUserRequest,
            CurrentUserResponse,
            MessageResponse,
            SocialTokenRequest,
            TwitterLoginRequest,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Local accounts, sessions, email verification and password reset"),
        (name = "Social", description = "Sign-in with Google, Facebook and Twitter")
    ),
    info(
        title = "SocialAuth API",
        version = "0.1.0",
        description = "User accounts and social login issuing JWT access/refresh token pairs.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/user/register",
            "/user/token",
            "/user/token/refresh",
            "/user/password-change",
            "/user/email-verify",
            "/user/request-reset-email",
            "/user/password-reset/{uidb64}/{token}",
            "/user/password-reset-complete",
            "/user/current",
            "/social/google",
            "/social/facebook",
            "/social/twitter",
            "/social/twitter/oauth/request_token",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{} missing", path);
        }
    }
}

//! Request and response bodies for the `/user` endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use socialauth_core::validate_password_strength;

use crate::accounts::Account;
use crate::handle::{validate_handle, validate_phone};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(max = 150, message = "Full name must be at most 150 characters"))]
    #[schema(example = "Ana Lopez")]
    pub full_name: String,
    #[validate(custom(function = "validate_handle"))]
    #[schema(example = "ana")]
    pub username: String,
    #[validate(email(message = "Enter a valid email address"))]
    #[schema(example = "ana@x.com")]
    pub email: String,
    #[validate(custom(function = "validate_phone"))]
    #[schema(example = "9800000000")]
    pub phone: String,
    #[validate(custom(function = "validate_password_strength"))]
    #[schema(example = "abc12345")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<&Account> for RegisterResponse {
    fn from(account: &Account) -> Self {
        Self {
            full_name: account.full_name.clone(),
            username: account.username.clone(),
            email: account.email.clone(),
            phone: account.phone.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address"))]
    #[schema(example = "ana@x.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "abc12345")]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Old password is required"))]
    pub old_password: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailVerifyQuery {
    /// Activation token from the verification email
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResetEmailRequest {
    #[validate(email(message = "Enter a valid email address"))]
    #[schema(example = "ana@x.com")]
    pub email: String,
    /// Where the emailed link should finally land (web or app deep link)
    #[serde(default)]
    #[validate(length(max = 500, message = "Redirect URL is too long"))]
    pub redirect_url: String,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResetCheckQuery {
    #[serde(default)]
    pub redirect_url: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResetCompleteRequest {
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
    #[validate(length(min = 1, message = "uidb64 is required"))]
    pub uidb64: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCurrentUserRequest {
    #[validate(length(max = 150, message = "Full name must be at most 150 characters"))]
    pub full_name: Option<String>,
    #[validate(custom(function = "validate_handle"))]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUserResponse {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub email: String,
}

impl From<&Account> for CurrentUserResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            full_name: account.full_name.clone(),
            username: account.username.clone(),
            email: account.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

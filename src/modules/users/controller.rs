use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use socialauth_core::AppError;
use socialauth_models::{
    ChangePasswordRequest, CurrentUserResponse, EmailVerifyQuery, LoginRequest, MessageResponse,
    RefreshTokenRequest, RegisterRequest, RegisterResponse, ResetCheckQuery, ResetCompleteRequest,
    ResetEmailRequest, TokenPair, UpdateCurrentUserRequest,
};

use super::service::UserService;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Error body returned by every endpoint.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
    /// Field name -> messages, present on validation errors.
    #[schema(value_type = Option<Object>)]
    pub errors: Option<serde_json::Value>,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/user/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, verification email queued", body = RegisterResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 422, description = "Validation error or duplicate email/username/phone", body = ErrorResponse)
    ),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let account = UserService::register(&state, dto).await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse::from(&account))))
}

/// Obtain an access/refresh token pair with email and password
#[utoipa::path(
    post,
    path = "/user/token",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenPair),
        (status = 401, description = "Invalid credentials, unverified account or wrong provider", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn obtain_token(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let pair = UserService::login(&state, dto).await?;
    Ok(Json(pair))
}

/// Rotate a refresh token
#[utoipa::path(
    post,
    path = "/user/token/refresh",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New token pair", body = TokenPair),
        (status = 401, description = "Token invalid, expired or already used", body = ErrorResponse)
    ),
    tag = "Users"
)]
#[instrument(skip_all)]
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RefreshTokenRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let pair = UserService::refresh(&state, dto).await?;
    Ok(Json(pair))
}

/// Change the signed-in account's password
#[utoipa::path(
    post,
    path = "/user/password-change",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 422, description = "Wrong old password or mismatched confirmation", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, dto), fields(account = auth_user.email()))]
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    UserService::change_password(&state, auth_user.user_id()?, dto).await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// Activate an account from the emailed link
#[utoipa::path(
    get,
    path = "/user/email-verify",
    params(EmailVerifyQuery),
    responses(
        (status = 200, description = "Account activated or already verified", body = MessageResponse),
        (status = 400, description = "Activation token expired or invalid", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users"
)]
#[instrument(skip_all)]
pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<EmailVerifyQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    let message = UserService::verify_email(&state, &query.token).await?;
    Ok(Json(MessageResponse::new(message)))
}

/// Email a password reset link
#[utoipa::path(
    post,
    path = "/user/request-reset-email",
    request_body = ResetEmailRequest,
    responses(
        (status = 200, description = "Reset link queued", body = MessageResponse),
        (status = 422, description = "No account found", body = ErrorResponse)
    ),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn request_reset_email(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ResetEmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    UserService::request_password_reset(&state, dto).await?;
    Ok(Json(MessageResponse::new(
        "Password reset link sent to your email",
    )))
}

/// Check a password reset link and redirect to the client
#[utoipa::path(
    get,
    path = "/user/password-reset/{uidb64}/{token}",
    params(
        ("uidb64" = String, Path, description = "Base64 encoded account id"),
        ("token" = String, Path, description = "Password reset token"),
        ResetCheckQuery
    ),
    responses(
        (status = 303, description = "Redirect carrying token_valid=true|false")
    ),
    tag = "Users"
)]
#[instrument(skip(state, token))]
pub async fn check_reset_link(
    State(state): State<AppState>,
    Path((uidb64, token)): Path<(String, String)>,
    Query(query): Query<ResetCheckQuery>,
) -> Redirect {
    let location =
        UserService::check_reset_link(&state, &uidb64, &token, &query.redirect_url).await;
    Redirect::to(&location)
}

/// Set a new password using a reset link
#[utoipa::path(
    patch,
    path = "/user/password-reset-complete",
    request_body = ResetCompleteRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Reset link invalid or expired", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Users"
)]
#[instrument(skip_all)]
pub async fn complete_password_reset(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ResetCompleteRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    UserService::complete_password_reset(&state, dto).await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// Get the signed-in account
#[utoipa::path(
    get,
    path = "/user/current",
    responses(
        (status = 200, description = "Current account", body = CurrentUserResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state), fields(account = auth_user.email()))]
pub async fn get_current_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<CurrentUserResponse>, AppError> {
    let account = UserService::current_user(&state, auth_user.user_id()?).await?;
    Ok(Json(CurrentUserResponse::from(&account)))
}

/// Update the signed-in account's name or handle
#[utoipa::path(
    patch,
    path = "/user/current",
    request_body = UpdateCurrentUserRequest,
    responses(
        (status = 200, description = "Updated account", body = CurrentUserResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 422, description = "Validation error or handle taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, dto), fields(account = auth_user.email()))]
pub async fn update_current_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateCurrentUserRequest>,
) -> Result<Json<CurrentUserResponse>, AppError> {
    let account = UserService::update_current_user(&state, auth_user.user_id()?, dto).await?;
    Ok(Json(CurrentUserResponse::from(&account)))
}

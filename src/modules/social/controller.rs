use std::collections::BTreeMap;

use axum::Json;
use axum::extract::State;
use tracing::instrument;

use socialauth_core::AppError;
use socialauth_models::{SocialTokenRequest, TokenPair, TwitterLoginRequest};

use super::service::SocialService;
use crate::modules::users::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Sign in with a Google ID token
#[utoipa::path(
    post,
    path = "/social/google",
    request_body = SocialTokenRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenPair),
        (status = 400, description = "Token rejected by Google", body = ErrorResponse),
        (status = 401, description = "Token issued for another client, or account uses another provider", body = ErrorResponse),
        (status = 502, description = "Google unreachable", body = ErrorResponse)
    ),
    tag = "Social"
)]
#[instrument(skip_all)]
pub async fn google_login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SocialTokenRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let pair = SocialService::login_with_token(&state, &state.google, &dto.auth_token).await?;
    Ok(Json(pair))
}

/// Sign in with a Facebook user access token
#[utoipa::path(
    post,
    path = "/social/facebook",
    request_body = SocialTokenRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenPair),
        (status = 400, description = "Token rejected by Facebook", body = ErrorResponse),
        (status = 401, description = "Token issued for another app, or account uses another provider", body = ErrorResponse),
        (status = 502, description = "Facebook unreachable", body = ErrorResponse)
    ),
    tag = "Social"
)]
#[instrument(skip_all)]
pub async fn facebook_login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SocialTokenRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let pair = SocialService::login_with_token(&state, &state.facebook, &dto.auth_token).await?;
    Ok(Json(pair))
}

/// Sign in with a Twitter OAuth token and verifier
#[utoipa::path(
    post,
    path = "/social/twitter",
    request_body = TwitterLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenPair),
        (status = 400, description = "Tokens rejected by Twitter", body = ErrorResponse),
        (status = 401, description = "Account uses another provider", body = ErrorResponse),
        (status = 502, description = "Twitter unreachable", body = ErrorResponse)
    ),
    tag = "Social"
)]
#[instrument(skip_all)]
pub async fn twitter_login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<TwitterLoginRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let pair =
        SocialService::login_with_twitter(&state, &dto.oauth_token, &dto.oauth_verifier).await?;
    Ok(Json(pair))
}

/// Start the Twitter OAuth flow
#[utoipa::path(
    post,
    path = "/social/twitter/oauth/request_token",
    responses(
        (status = 200, description = "Twitter request token fields", body = BTreeMap<String, String>),
        (status = 502, description = "Twitter unreachable or refused the request", body = ErrorResponse)
    ),
    tag = "Social"
)]
#[instrument(skip_all)]
pub async fn twitter_request_token(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, String>>, AppError> {
    let fields = SocialService::twitter_request_token(&state).await?;
    Ok(Json(fields))
}

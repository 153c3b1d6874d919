use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};
use url::Url;
use uuid::Uuid;

use socialauth_auth::{
    TokenPair, check_reset_token, create_email_verification_token, create_token_pair, decode_uid,
    encode_uid, make_reset_token, verify_email_verification_token, verify_refresh_token,
};
use socialauth_config::AppConfig;
use socialauth_core::{AppError, hash_password, verify_password};
use socialauth_db::duplicate_field;
use socialauth_models::{
    Account, AuthProvider, ChangePasswordRequest, LoginRequest, NewAccount, RefreshTokenRequest,
    RegisterRequest, ResetCompleteRequest, ResetEmailRequest, UpdateCurrentUserRequest,
};

use crate::metrics::{
    track_login_failure, track_login_success, track_registration, track_tokens_issued,
};
use crate::state::AppState;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const VERIFY_EMAIL_FIRST: &str = "Please verify email to continue";
pub const ACCOUNT_DISABLED: &str = "Account disabled, contact admin";
pub const TOKEN_BLACKLISTED: &str = "Token is blacklisted";
pub const NO_ACTIVE_ACCOUNT: &str = "No active account found with the given credentials";
pub const PASSWORD_MISMATCH: &str = "New password and confirm password does not match";
pub const NO_ACCOUNT_FOUND: &str = "No account found";
pub const ACCOUNT_ACTIVATED: &str = "Account successfully activated";
pub const ACCOUNT_ALREADY_VERIFIED: &str = "Account already verified";

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Message for an account that must sign in through its original provider.
pub(crate) fn provider_mismatch(provider: AuthProvider) -> AppError {
    AppError::unauthorized(format!("Please continue your login using {}", provider))
}

/// Issues a session pair for `account` and counts it under `source`.
pub(crate) fn issue_tokens(
    state: &AppState,
    account: &Account,
    source: &str,
) -> Result<TokenPair, AppError> {
    let pair = create_token_pair(account.id, &account.email, &state.jwt_config)?;
    track_tokens_issued(source);
    Ok(pair)
}

/// Where a password reset link check should send the browser.
///
/// `redirect_url` wins when it is longer than three characters and uses an
/// allowed scheme; otherwise the configured frontend is used.
pub fn reset_redirect_target(app_config: &AppConfig, redirect_url: &str) -> String {
    let allowed = redirect_url.len() > 3
        && Url::parse(redirect_url)
            .map(|url| app_config.allowed_redirect_schemes().contains(&url.scheme()))
            .unwrap_or(false);

    if allowed {
        redirect_url.to_string()
    } else {
        app_config.frontend_url.clone()
    }
}

fn with_query(target: &str, params: &[(&str, &str)]) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    let separator = if target.contains('?') { '&' } else { '?' };
    format!("{}{}{}", target, separator, query)
}

pub struct UserService;

impl UserService {
    #[instrument(skip(state, dto), fields(username = %dto.username))]
    pub async fn register(state: &AppState, dto: RegisterRequest) -> Result<Account, AppError> {
        let email = normalize_email(&dto.email);
        let username = dto.username.trim().to_string();
        let phone = dto.phone.trim().to_string();

        if state.accounts.find_by_email(&email).await?.is_some() {
            return Err(duplicate_field("email"));
        }
        if state.accounts.username_exists(&username).await? {
            return Err(duplicate_field("username"));
        }
        if state.accounts.phone_exists(&phone).await? {
            return Err(duplicate_field("phone"));
        }

        let password_hash = hash_password(&dto.password)?;
        let account = state
            .accounts
            .create(NewAccount::local(
                dto.full_name.trim().to_string(),
                username,
                email,
                phone,
                password_hash,
            ))
            .await?;

        Self::send_verification_email(state, &account)?;
        track_registration(AuthProvider::Email.as_str());
        info!(account_id = %account.id, "account registered");

        Ok(account)
    }

    #[instrument(skip(state, dto))]
    pub async fn login(state: &AppState, dto: LoginRequest) -> Result<TokenPair, AppError> {
        let email = normalize_email(&dto.email);
        let provider = AuthProvider::Email.as_str();

        let Some(account) = state.accounts.find_by_email(&email).await? else {
            track_login_failure(provider, "unknown_account");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(&dto.password, &account.password_hash)? {
            track_login_failure(provider, "bad_password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        if !account.is_active {
            track_login_failure(provider, "inactive");
            return Err(AppError::unauthorized(ACCOUNT_DISABLED));
        }

        if account.auth_provider != AuthProvider::Email {
            track_login_failure(provider, "provider_mismatch");
            return Err(provider_mismatch(account.auth_provider));
        }

        if !account.is_verified {
            Self::send_verification_email(state, &account)?;
            track_login_failure(provider, "unverified");
            return Err(AppError::unauthorized(VERIFY_EMAIL_FIRST));
        }

        let pair = issue_tokens(state, &account, "login")?;
        track_login_success(provider);
        Ok(pair)
    }

    /// Exchanges a refresh token for a new pair. Each refresh token works once.
    #[instrument(skip_all)]
    pub async fn refresh(
        state: &AppState,
        dto: RefreshTokenRequest,
    ) -> Result<TokenPair, AppError> {
        let claims = verify_refresh_token(&dto.refresh, &state.jwt_config)?;

        let account_id = Uuid::parse_str(&claims.sub).map_err(|_| {
            AppError::unauthorized("Token contained no recognizable user identification")
        })?;
        let expires_at =
            DateTime::<Utc>::from_timestamp(claims.exp as i64, 0).unwrap_or_else(Utc::now);

        if !state
            .refresh_tokens
            .blacklist(&claims.jti, account_id, expires_at)
            .await?
        {
            warn!(%account_id, "refresh token reused");
            return Err(AppError::unauthorized(TOKEN_BLACKLISTED));
        }

        let account = state
            .accounts
            .find_by_id(account_id)
            .await?
            .filter(|account| account.is_active)
            .ok_or_else(|| AppError::unauthorized(NO_ACTIVE_ACCOUNT))?;

        issue_tokens(state, &account, "refresh")
    }

    #[instrument(skip(state, dto))]
    pub async fn change_password(
        state: &AppState,
        account_id: Uuid,
        dto: ChangePasswordRequest,
    ) -> Result<(), AppError> {
        if dto.new_password != dto.confirm_password {
            return Err(AppError::unprocessable(PASSWORD_MISMATCH));
        }

        let mut account = Self::current_user(state, account_id).await?;

        if !verify_password(&dto.old_password, &account.password_hash)? {
            return Err(AppError::unprocessable(INVALID_CREDENTIALS));
        }

        account.password_hash = hash_password(&dto.new_password)?;
        let account = state.accounts.save(&account).await?;

        state
            .email
            .send_password_changed_notice(&account.email, &account.full_name);
        Ok(())
    }

    /// Marks the account named by an activation token as verified.
    /// Returns the message to show the user.
    #[instrument(skip_all)]
    pub async fn verify_email(state: &AppState, token: &str) -> Result<&'static str, AppError> {
        let account_id = verify_email_verification_token(token, &state.jwt_config)?;

        let mut account = state
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        if account.is_verified {
            return Ok(ACCOUNT_ALREADY_VERIFIED);
        }

        account.is_verified = true;
        state.accounts.save(&account).await?;
        info!(%account_id, "account verified");

        Ok(ACCOUNT_ACTIVATED)
    }

    #[instrument(skip(state, dto))]
    pub async fn request_password_reset(
        state: &AppState,
        dto: ResetEmailRequest,
    ) -> Result<(), AppError> {
        let email = normalize_email(&dto.email);
        let account = state
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::unprocessable(NO_ACCOUNT_FOUND))?;

        let uidb64 = encode_uid(account.id);
        let token = make_reset_token(account.id, &account.password_hash, &state.jwt_config)?;

        state.email.send_password_reset_email(
            &account.email,
            &account.full_name,
            &uidb64,
            &token,
            &dto.redirect_url,
        );
        Ok(())
    }

    /// Checks a reset link and returns the URL to redirect to.
    ///
    /// Never fails: every problem with the link ends up as
    /// `token_valid=false` on the redirect.
    #[instrument(skip(state, token))]
    pub async fn check_reset_link(
        state: &AppState,
        uidb64: &str,
        token: &str,
        redirect_url: &str,
    ) -> String {
        let target = reset_redirect_target(&state.app_config, redirect_url);

        let valid = match Self::account_for_reset(state, uidb64, token).await {
            Ok(_) => true,
            Err(e) => {
                info!(reason = %e.error, "password reset link rejected");
                false
            }
        };

        if valid {
            with_query(
                &target,
                &[
                    ("token_valid", "true"),
                    ("message", "tokenvalid"),
                    ("uidb64", uidb64),
                    ("token", token),
                ],
            )
        } else {
            with_query(&target, &[("token_valid", "false")])
        }
    }

    #[instrument(skip_all)]
    pub async fn complete_password_reset(
        state: &AppState,
        dto: ResetCompleteRequest,
    ) -> Result<(), AppError> {
        let mut account = Self::account_for_reset(state, &dto.uidb64, &dto.token).await?;

        account.password_hash = hash_password(&dto.password)?;
        let account = state.accounts.save(&account).await?;
        info!(account_id = %account.id, "password reset completed");

        state
            .email
            .send_password_changed_notice(&account.email, &account.full_name);
        Ok(())
    }

    async fn account_for_reset(
        state: &AppState,
        uidb64: &str,
        token: &str,
    ) -> Result<Account, AppError> {
        let invalid = || AppError::token_invalid(socialauth_auth::reset_token::RESET_LINK_INVALID);

        let account_id = decode_uid(uidb64).ok_or_else(invalid)?;
        let account = state
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(invalid)?;

        check_reset_token(account.id, &account.password_hash, token, &state.jwt_config)?;
        Ok(account)
    }

    #[instrument(skip(state))]
    pub async fn current_user(state: &AppState, account_id: Uuid) -> Result<Account, AppError> {
        state
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))
    }

    #[instrument(skip(state, dto))]
    pub async fn update_current_user(
        state: &AppState,
        account_id: Uuid,
        dto: UpdateCurrentUserRequest,
    ) -> Result<Account, AppError> {
        let mut account = Self::current_user(state, account_id).await?;

        if let Some(username) = dto.username.map(|u| u.trim().to_string()) {
            if username != account.username {
                if state.accounts.username_exists(&username).await? {
                    return Err(duplicate_field("username"));
                }
                account.username = username;
            }
        }
        if let Some(full_name) = dto.full_name {
            account.full_name = full_name.trim().to_string();
        }

        state.accounts.save(&account).await
    }

    fn send_verification_email(state: &AppState, account: &Account) -> Result<(), AppError> {
        let token = create_email_verification_token(account.id, &state.jwt_config)?;
        state
            .email
            .send_verification_email(&account.email, &account.full_name, &token);
        Ok(())
    }
}

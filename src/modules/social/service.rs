//! Binding third-party identities to local accounts.
//!
//! A verified identity resolves to a local account by email:
//!
//! - no account yet: one is created, verified, tagged with the provider and
//!   given a handle derived from the display name
//! - account with the same provider tag: it is signed in
//! - account with another provider tag: rejected, naming the original one

use std::collections::BTreeMap;

use tracing::{info, instrument};

use socialauth_core::{AppError, ErrorKind, hash_password, verify_password};
use socialauth_models::handle::{derive_handle_base, handle_candidate};
use socialauth_models::{Account, AuthProvider, NewAccount, TokenPair};
use socialauth_providers::{SocialIdentity, TokenVerifier};

use crate::metrics::{track_login_failure, track_login_success, track_registration};
use crate::modules::users::service::{issue_tokens, normalize_email, provider_mismatch};
use crate::state::AppState;

/// Upper bound on handle suffixes tried before giving up.
const MAX_HANDLE_ATTEMPTS: u32 = 10_000;

pub struct SocialService;

impl SocialService {
    /// Verifies a bearer credential with `verifier` and signs the owner in.
    #[instrument(skip(state, verifier, token), fields(provider = %verifier.provider()))]
    pub async fn login_with_token(
        state: &AppState,
        verifier: &dyn TokenVerifier,
        token: &str,
    ) -> Result<TokenPair, AppError> {
        let provider = verifier.provider();
        let identity = verifier.verify(token).await.map_err(|e| {
            track_login_failure(provider.as_str(), "provider_rejected");
            e.into_app_error()
        })?;

        Self::login(state, provider, identity).await
    }

    #[instrument(skip_all)]
    pub async fn login_with_twitter(
        state: &AppState,
        oauth_token: &str,
        oauth_verifier: &str,
    ) -> Result<TokenPair, AppError> {
        let identity = state
            .twitter
            .verify(oauth_token, oauth_verifier)
            .await
            .map_err(|e| {
                track_login_failure(AuthProvider::Twitter.as_str(), "provider_rejected");
                e.into_app_error()
            })?;

        Self::login(state, AuthProvider::Twitter, identity).await
    }

    #[instrument(skip(state))]
    pub async fn twitter_request_token(
        state: &AppState,
    ) -> Result<BTreeMap<String, String>, AppError> {
        state
            .twitter
            .request_token()
            .await
            .map_err(|e| e.into_app_error())
    }

    async fn login(
        state: &AppState,
        provider: AuthProvider,
        identity: SocialIdentity,
    ) -> Result<TokenPair, AppError> {
        let account = Self::resolve_account(state, provider, &identity)
            .await
            .inspect_err(|e| {
                if e.kind == ErrorKind::AuthenticationFailed {
                    track_login_failure(provider.as_str(), "provider_mismatch");
                }
            })?;

        let pair = issue_tokens(state, &account, provider.as_str())?;
        track_login_success(provider.as_str());
        Ok(pair)
    }

    /// Finds or creates the local account for a verified identity.
    #[instrument(skip(state, identity), fields(%provider))]
    pub async fn resolve_account(
        state: &AppState,
        provider: AuthProvider,
        identity: &SocialIdentity,
    ) -> Result<Account, AppError> {
        let secret = &state.social_config.social_secret;
        if secret.is_empty() {
            return Err(AppError::internal_error("SOCIAL_SECRET is not configured"));
        }

        let email = normalize_email(&identity.email);

        if let Some(account) = state.accounts.find_by_email(&email).await? {
            if account.auth_provider != provider {
                return Err(provider_mismatch(account.auth_provider));
            }
            if !verify_password(secret, &account.password_hash)? {
                return Err(AppError::unauthorized("Invalid credentials"));
            }
            if !account.is_active {
                return Err(AppError::unauthorized("Account disabled, contact admin"));
            }
            return Ok(account);
        }

        let username = Self::unique_handle(state, &identity.full_name, &email).await?;
        let account = state
            .accounts
            .create(NewAccount::social(
                provider,
                identity.full_name.trim().to_string(),
                username,
                email,
                hash_password(secret)?,
            ))
            .await?;

        track_registration(provider.as_str());
        info!(account_id = %account.id, username = %account.username, "social account created");
        Ok(account)
    }

    /// The derived base handle, or the first free `base1`, `base2`, ...
    async fn unique_handle(
        state: &AppState,
        full_name: &str,
        email: &str,
    ) -> Result<String, AppError> {
        let base = derive_handle_base(full_name, email);

        for attempt in 0..MAX_HANDLE_ATTEMPTS {
            let candidate = handle_candidate(&base, attempt);
            if !state.accounts.username_exists(&candidate).await? {
                return Ok(candidate);
            }
        }

        Err(AppError::internal_error(format!("no free handle for base {}", base)))
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use socialauth_core::AppError;
use socialauth_models::{Account, NewAccount};

/// Account persistence.
///
/// Email, username and phone are unique. Writes that would break that
/// fail with a validation error naming the offending field.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError>;

    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;

    async fn phone_exists(&self, phone: &str) -> Result<bool, AppError>;

    async fn create(&self, account: NewAccount) -> Result<Account, AppError>;

    /// Persists every mutable column of `account` and bumps `modified_at`.
    async fn save(&self, account: &Account) -> Result<Account, AppError>;
}

/// Consumed refresh tokens, keyed by `jti`.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Records `jti` as used. Returns `false` when it was already recorded.
    async fn blacklist(
        &self,
        jti: &str,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// Drops entries whose token would have expired anyway.
    async fn purge_expired(&self) -> Result<u64, AppError>;
}

pub fn duplicate_field(field: &str) -> AppError {
    AppError::field(field, format!("An account with this {} already exists.", field))
}

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use socialauth_core::AppError;
use socialauth_models::{Account, AuthProvider, NewAccount};

use crate::repository::{AccountRepository, RefreshTokenStore, duplicate_field};

const ACCOUNT_COLUMNS: &str = "id, full_name, username, email, phone, password_hash, \
     auth_provider, is_staff, is_active, is_verified, created_at, modified_at";

#[derive(FromRow)]
struct AccountRow {
    id: Uuid,
    full_name: String,
    username: String,
    email: String,
    phone: Option<String>,
    password_hash: String,
    auth_provider: String,
    is_staff: bool,
    is_active: bool,
    is_verified: bool,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AppError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let auth_provider: AuthProvider = row.auth_provider.parse()?;
        Ok(Account {
            id: row.id,
            full_name: row.full_name,
            username: row.username,
            email: row.email,
            phone: row.phone,
            password_hash: row.password_hash,
            auth_provider,
            is_staff: row.is_staff,
            is_active: row.is_active,
            is_verified: row.is_verified,
            created_at: row.created_at,
            modified_at: row.modified_at,
        })
    }
}

/// Maps unique violations onto the field they guard.
fn write_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some(c) if c.contains("username") => "username",
                Some(c) if c.contains("phone") => "phone",
                _ => "email",
            };
            return duplicate_field(field);
        }
    }
    AppError::from(err)
}

#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn phone_exists(&self, phone: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE phone = $1)")
                .bind(phone)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    #[instrument(skip(self, account), fields(email = %account.email, provider = %account.auth_provider))]
    async fn create(&self, account: NewAccount) -> Result<Account, AppError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "INSERT INTO accounts (id, full_name, username, email, phone, password_hash, \
             auth_provider, is_staff, is_active, is_verified) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE, $9) \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&account.full_name)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.phone)
        .bind(&account.password_hash)
        .bind(account.auth_provider.as_str())
        .bind(account.is_staff)
        .bind(account.is_verified)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        Account::try_from(row)
    }

    #[instrument(skip(self, account), fields(account_id = %account.id))]
    async fn save(&self, account: &Account) -> Result<Account, AppError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "UPDATE accounts SET full_name = $2, username = $3, phone = $4, \
             password_hash = $5, is_staff = $6, is_active = $7, is_verified = $8, \
             modified_at = NOW() \
             WHERE id = $1 \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(account.id)
        .bind(&account.full_name)
        .bind(&account.username)
        .bind(&account.phone)
        .bind(&account.password_hash)
        .bind(account.is_staff)
        .bind(account.is_active)
        .bind(account.is_verified)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error)?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        Account::try_from(row)
    }
}

#[derive(Clone)]
pub struct PgRefreshTokenStore {
    pool: PgPool,
}

impl PgRefreshTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStore for PgRefreshTokenStore {
    #[instrument(skip(self))]
    async fn blacklist(
        &self,
        jti: &str,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO refresh_token_blacklist (jti, account_id, expires_at) \
             VALUES ($1, $2, $3) ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(account_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM refresh_token_blacklist WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

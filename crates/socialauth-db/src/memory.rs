//! In-process repositories for tests and local experiments.
//!
//! They enforce the same uniqueness rules as the PostgreSQL schema so the
//! service layer behaves identically on top of either.

use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use socialauth_core::AppError;
use socialauth_models::{Account, NewAccount};

use crate::repository::{AccountRepository, RefreshTokenStore, duplicate_field};

#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

fn check_unique(
    accounts: &HashMap<Uuid, Account>,
    id: Uuid,
    email: &str,
    username: &str,
    phone: Option<&str>,
) -> Result<(), AppError> {
    for other in accounts.values().filter(|a| a.id != id) {
        if other.username == username {
            return Err(duplicate_field("username"));
        }
        if other.email == email {
            return Err(duplicate_field("email"));
        }
        if phone.is_some() && other.phone.as_deref() == phone {
            return Err(duplicate_field("phone"));
        }
    }
    Ok(())
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().any(|a| a.username == username))
    }

    async fn phone_exists(&self, phone: &str) -> Result<bool, AppError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().any(|a| a.phone.as_deref() == Some(phone)))
    }

    async fn create(&self, new: NewAccount) -> Result<Account, AppError> {
        let mut accounts = self.accounts.write().await;
        let id = Uuid::new_v4();
        check_unique(
            &accounts,
            id,
            &new.email,
            &new.username,
            new.phone.as_deref(),
        )?;

        let now = Utc::now();
        let account = Account {
            id,
            full_name: new.full_name,
            username: new.username,
            email: new.email,
            phone: new.phone,
            password_hash: new.password_hash,
            auth_provider: new.auth_provider,
            is_staff: new.is_staff,
            is_active: true,
            is_verified: new.is_verified,
            created_at: now,
            modified_at: now,
        };
        accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn save(&self, account: &Account) -> Result<Account, AppError> {
        let mut accounts = self.accounts.write().await;
        check_unique(
            &accounts,
            account.id,
            &account.email,
            &account.username,
            account.phone.as_deref(),
        )?;

        let stored = accounts
            .get_mut(&account.id)
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        // email, provider and created_at are immutable
        stored.full_name = account.full_name.clone();
        stored.username = account.username.clone();
        stored.phone = account.phone.clone();
        stored.password_hash = account.password_hash.clone();
        stored.is_staff = account.is_staff;
        stored.is_active = account.is_active;
        stored.is_verified = account.is_verified;
        stored.modified_at = Utc::now();

        Ok(stored.clone())
    }
}

#[derive(Default)]
pub struct InMemoryRefreshTokenStore {
    entries: RwLock<HashMap<String, (Uuid, DateTime<Utc>)>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn blacklist(
        &self,
        jti: &str,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(jti) {
            return Ok(false);
        }
        entries.insert(jti.to_string(), (account_id, expires_at));
        Ok(true)
    }

    async fn purge_expired(&self) -> Result<u64, AppError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let now = Utc::now();
        entries.retain(|_, (_, expires_at)| *expires_at >= now);
        Ok((before - entries.len()) as u64)
    }
}

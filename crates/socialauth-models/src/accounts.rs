//! The account entity and its provider tag.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Where an account came from. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Email,
    Google,
    Facebook,
    Twitter,
}

impl AuthProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthProvider::Email => "email",
            AuthProvider::Google => "google",
            AuthProvider::Facebook => "facebook",
            AuthProvider::Twitter => "twitter",
        }
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProvider(pub String);

impl fmt::Display for UnknownProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown auth provider: {}", self.0)
    }
}

impl std::error::Error for UnknownProvider {}

impl FromStr for AuthProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(AuthProvider::Email),
            "google" => Ok(AuthProvider::Google),
            "facebook" => Ok(AuthProvider::Facebook),
            "twitter" => Ok(AuthProvider::Twitter),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Account {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub auth_provider: AuthProvider,
    pub is_staff: bool,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Insert payload. The repository assigns `id` and timestamps.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub auth_provider: AuthProvider,
    pub is_staff: bool,
    pub is_verified: bool,
}

impl NewAccount {
    /// A local, unverified account as created by `/user/register`.
    pub fn local(
        full_name: String,
        username: String,
        email: String,
        phone: String,
        password_hash: String,
    ) -> Self {
        Self {
            full_name,
            username,
            email,
            phone: Some(phone),
            password_hash,
            auth_provider: AuthProvider::Email,
            is_staff: false,
            is_verified: false,
        }
    }

    /// A verified account created on first third-party login.
    pub fn social(
        provider: AuthProvider,
        full_name: String,
        username: String,
        email: String,
        password_hash: String,
    ) -> Self {
        Self {
            full_name,
            username,
            email,
            phone: None,
            password_hash,
            auth_provider: provider,
            is_staff: false,
            is_verified: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_round_trips_through_text() {
        for provider in [
            AuthProvider::Email,
            AuthProvider::Google,
            AuthProvider::Facebook,
            AuthProvider::Twitter,
        ] {
            assert_eq!(provider.as_str().parse::<AuthProvider>(), Ok(provider));
        }
        assert!("github".parse::<AuthProvider>().is_err());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            full_name: "Ana".into(),
            username: "ana".into(),
            email: "ana@x.com".into(),
            phone: None,
            password_hash: "$2b$12$secret".into(),
            auth_provider: AuthProvider::Google,
            is_staff: false,
            is_active: true,
            is_verified: true,
            created_at: now,
            modified_at: now,
        };
        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["auth_provider"], "google");
    }

    #[test]
    fn social_accounts_start_verified_without_phone() {
        let new = NewAccount::social(
            AuthProvider::Twitter,
            "Ana".into(),
            "ana".into(),
            "ana@x.com".into(),
            "hash".into(),
        );
        assert!(new.is_verified);
        assert!(new.phone.is_none());
    }
}

//! # SocialAuth CLI
//!
//! Administrative operations that are deliberately not exposed over HTTP.
//!
//! ```ignore
//! use socialauth_cli::{SuperuserInput, create_superuser};
//!
//! let account = create_superuser(&repo, input).await?;
//! ```

use validator::ValidateEmail;

use socialauth_core::{AppError, hash_password, validate_password_strength};
use socialauth_db::{AccountRepository, duplicate_field};
use socialauth_models::handle::{validate_handle, validate_phone};
use socialauth_models::{Account, NewAccount};

#[derive(Debug, Clone)]
pub struct SuperuserInput {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

fn rule_message(err: validator::ValidationError) -> String {
    err.message
        .map(|m| m.to_string())
        .unwrap_or_else(|| err.code.to_string())
}

/// Creates an active, verified staff account using the `email` provider.
pub async fn create_superuser(
    accounts: &dyn AccountRepository,
    input: SuperuserInput,
) -> Result<Account, AppError> {
    let email = input.email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(AppError::field("email", "Enter a valid email address"));
    }
    validate_handle(&input.username).map_err(|e| AppError::field("username", rule_message(e)))?;
    validate_password_strength(&input.password)
        .map_err(|e| AppError::field("password", rule_message(e)))?;

    let phone = input
        .phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());
    if let Some(phone) = &phone {
        validate_phone(phone).map_err(|e| AppError::field("phone", rule_message(e)))?;
        if accounts.phone_exists(phone).await? {
            return Err(duplicate_field("phone"));
        }
    }

    if accounts.find_by_email(&email).await?.is_some() {
        return Err(duplicate_field("email"));
    }
    if accounts.username_exists(&input.username).await? {
        return Err(duplicate_field("username"));
    }

    let mut account = NewAccount::local(
        input.full_name.trim().to_string(),
        input.username,
        email,
        String::new(),
        hash_password(&input.password)?,
    );
    account.phone = phone;
    account.is_staff = true;
    account.is_verified = true;

    accounts.create(account).await
}

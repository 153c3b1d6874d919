//! Run with a database available:
//! `DATABASE_URL=postgres://... cargo test -p socialauth-db -- --ignored`

use chrono::{Duration, Utc};
use socialauth_core::ErrorKind;
use socialauth_db::{AccountRepository, PgAccountRepository, PgRefreshTokenStore, RefreshTokenStore};
use socialauth_models::{AuthProvider, NewAccount};
use sqlx::PgPool;

fn local(username: &str, email: &str, phone: &str) -> NewAccount {
    NewAccount::local(
        "Test User".into(),
        username.into(),
        email.into(),
        phone.into(),
        "hash".into(),
    )
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn create_and_find_account(pool: PgPool) {
    let repo = PgAccountRepository::new(pool);
    let created = repo
        .create(local("ana", "ana@x.com", "9800000000"))
        .await
        .unwrap();

    let found = repo.find_by_email("ana@x.com").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.auth_provider, AuthProvider::Email);
    assert!(repo.username_exists("ana").await.unwrap());
    assert!(!repo.phone_exists("9800000001").await.unwrap());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn unique_violation_names_the_field(pool: PgPool) {
    let repo = PgAccountRepository::new(pool);
    repo.create(local("ana", "ana@x.com", "9800000000"))
        .await
        .unwrap();

    let err = repo
        .create(local("ana", "bob@x.com", "9800000001"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(err.details.unwrap().get("username").is_some());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn social_accounts_have_no_phone(pool: PgPool) {
    let repo = PgAccountRepository::new(pool);
    for (name, email) in [("a", "a@x.com"), ("b", "b@x.com")] {
        let account = repo
            .create(NewAccount::social(
                AuthProvider::Facebook,
                String::new(),
                name.into(),
                email.into(),
                "hash".into(),
            ))
            .await
            .unwrap();
        assert!(account.phone.is_none());
        assert!(account.is_verified);
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn save_persists_verification(pool: PgPool) {
    let repo = PgAccountRepository::new(pool);
    let mut account = repo
        .create(local("ana", "ana@x.com", "9800000000"))
        .await
        .unwrap();

    account.is_verified = true;
    let saved = repo.save(&account).await.unwrap();
    assert!(saved.is_verified);
    assert!(saved.modified_at >= saved.created_at);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn refresh_blacklist_is_single_use(pool: PgPool) {
    let accounts = PgAccountRepository::new(pool.clone());
    let store = PgRefreshTokenStore::new(pool);
    let account = accounts
        .create(local("ana", "ana@x.com", "9800000000"))
        .await
        .unwrap();
    let expires = Utc::now() + Duration::hours(1);

    assert!(store.blacklist("jti-1", account.id, expires).await.unwrap());
    assert!(!store.blacklist("jti-1", account.id, expires).await.unwrap());
    assert_eq!(store.purge_expired().await.unwrap(), 0);
}

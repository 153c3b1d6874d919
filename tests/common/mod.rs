#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use socialauth::router::init_router;
use socialauth::state::AppState;
use socialauth::utils::email::EmailService;
use socialauth::utils::mailer::{EmailDispatcher, MemoryTransport, OutgoingEmail};
use socialauth_config::{AppConfig, CorsConfig, JwtConfig, RateLimitConfig, SocialConfig};
use socialauth_db::{AccountRepository, InMemoryAccountRepository, InMemoryRefreshTokenStore};
use socialauth_models::Account;
use socialauth_providers::{FacebookClient, GoogleClient, TwitterClient};

pub const JWT_SECRET: &str = "integration-test-secret-key-0123456789";
pub const BASE_URL: &str = "http://api.test";
pub const FRONTEND_URL: &str = "http://front.test";
pub const GOOGLE_CLIENT_ID: &str = "google-client-id.apps.googleusercontent.com";
pub const FACEBOOK_APP_ID: &str = "1234567890";
pub const SOCIAL_SECRET: &str = "social-placeholder-secret";
pub const PASSWORD: &str = "abc12345";

/// Nothing listens here, so provider calls fail fast unless a test points a
/// client at a mock server.
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

pub struct TestApp {
    pub state: AppState,
    pub accounts: Arc<InMemoryAccountRepository>,
    pub mail: Arc<MemoryTransport>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_provider_url(UNREACHABLE)
    }

    /// Points the Google, Facebook and Twitter clients at `base_url`.
    pub fn with_provider_url(base_url: &str) -> Self {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let mail = Arc::new(MemoryTransport::new());
        let http = reqwest::Client::new();

        let social_config = SocialConfig {
            google_client_id: GOOGLE_CLIENT_ID.to_string(),
            facebook_app_id: FACEBOOK_APP_ID.to_string(),
            facebook_app_secret: "facebook-app-secret".to_string(),
            twitter_api_key: "twitter-key".to_string(),
            twitter_api_key_secret: "twitter-key-secret".to_string(),
            twitter_callback_url: "oob".to_string(),
            social_secret: SOCIAL_SECRET.to_string(),
        };

        let state = AppState {
            accounts: accounts.clone(),
            refresh_tokens: Arc::new(InMemoryRefreshTokenStore::new()),
            jwt_config: JwtConfig {
                secret: JWT_SECRET.to_string(),
                ..JwtConfig::default()
            },
            app_config: AppConfig {
                base_url: BASE_URL.to_string(),
                frontend_url: FRONTEND_URL.to_string(),
                app_scheme: "myapp".to_string(),
                ..AppConfig::default()
            },
            cors_config: CorsConfig {
                allowed_origins: vec!["http://localhost:3000".to_string()],
            },
            rate_limit_config: RateLimitConfig::disabled(),
            google: GoogleClient::new(http.clone(), &social_config.google_client_id)
                .with_base_url(base_url),
            facebook: FacebookClient::new(
                http.clone(),
                &social_config.facebook_app_id,
                &social_config.facebook_app_secret,
            )
            .with_base_url(base_url),
            twitter: TwitterClient::new(
                http,
                &social_config.twitter_api_key,
                &social_config.twitter_api_key_secret,
                &social_config.twitter_callback_url,
            )
            .with_base_url(base_url),
            social_config,
            email: EmailService::new(EmailDispatcher::spawn(mail.clone()), BASE_URL),
        };

        Self {
            state,
            accounts,
            mail,
        }
    }

    pub fn router(&self) -> Router {
        init_router(self.state.clone())
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        bearer: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&value).unwrap())
            }
            None => Body::empty(),
        };

        let response = self
            .router()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body), None).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn register(&self, username: &str, email: &str, phone: &str) -> TestResponse {
        self.post(
            "/user/register",
            json!({
                "full_name": "Test User",
                "username": username,
                "email": email,
                "phone": phone,
                "password": PASSWORD,
            }),
        )
        .await
    }

    /// Registers an account and marks it verified directly in the store.
    pub async fn verified_account(&self, email: &str) -> Account {
        let username = format!("u{}", &Uuid::new_v4().simple().to_string()[..12]);
        let phone = unique_phone();
        let response = self.register(&username, email, &phone).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        let mut account = self.account(email).await;
        account.is_verified = true;
        self.accounts.save(&account).await.unwrap()
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post("/user/token", json!({ "email": email, "password": password }))
            .await
    }

    pub async fn account(&self, email: &str) -> Account {
        self.accounts
            .find_by_email(email)
            .await
            .unwrap()
            .expect("account exists")
    }

    /// The `count`-th email delivered to `to`.
    pub async fn email_to(&self, to: &str, count: usize) -> OutgoingEmail {
        self.mail
            .wait_for(to, count)
            .await
            .unwrap_or_else(|| panic!("no email #{} to {}", count, to))
    }
}

/// First `http...` link in the plain-text body.
pub fn link_in(email: &OutgoingEmail) -> String {
    email
        .text_body
        .split_whitespace()
        .find(|word| word.starts_with("http"))
        .expect("email contains a link")
        .to_string()
}

/// Path and query of `link`, ready to send through the router.
pub fn local_path(link: &str) -> String {
    link.strip_prefix(BASE_URL).unwrap_or(link).to_string()
}

pub fn unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

pub fn unique_phone() -> String {
    let digits: String = Uuid::new_v4()
        .as_u128()
        .to_string()
        .chars()
        .take(10)
        .collect();
    format!("9{}", digits)
}

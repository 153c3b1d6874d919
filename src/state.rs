use std::sync::Arc;
use std::time::Duration;

use socialauth_config::{
    AppConfig, CorsConfig, EmailConfig, JwtConfig, RateLimitConfig, SocialConfig,
};
use socialauth_db::{
    AccountRepository, PgAccountRepository, PgPool, PgRefreshTokenStore, RefreshTokenStore,
};
use socialauth_providers::{FacebookClient, GoogleClient, TwitterClient};

use crate::utils::email::EmailService;
use crate::utils::mailer::{EmailDispatcher, EmailTransport, transport_from_config};

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountRepository>,
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    pub jwt_config: JwtConfig,
    pub app_config: AppConfig,
    pub social_config: SocialConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub google: GoogleClient,
    pub facebook: FacebookClient,
    pub twitter: TwitterClient,
    pub email: EmailService,
}

/// Outbound client shared by the identity providers and SendGrid.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
}

impl AppState {
    /// Wires the state from environment configuration around the given
    /// stores and mail transport. Spawns the mail worker, so it must run
    /// inside a Tokio runtime.
    pub fn from_env(
        accounts: Arc<dyn AccountRepository>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        transport: Arc<dyn EmailTransport>,
        http: reqwest::Client,
    ) -> Self {
        let app_config = AppConfig::from_env();
        let social_config = SocialConfig::from_env();

        let google = GoogleClient::new(http.clone(), social_config.google_client_id.clone());
        let facebook = FacebookClient::new(
            http.clone(),
            social_config.facebook_app_id.clone(),
            social_config.facebook_app_secret.clone(),
        );
        let twitter = TwitterClient::new(
            http,
            social_config.twitter_api_key.clone(),
            social_config.twitter_api_key_secret.clone(),
            social_config.twitter_callback_url.clone(),
        );

        let email = EmailService::new(EmailDispatcher::spawn(transport), &app_config.base_url);

        Self {
            accounts,
            refresh_tokens,
            jwt_config: JwtConfig::from_env(),
            app_config,
            social_config,
            cors_config: CorsConfig::from_env(),
            rate_limit_config: RateLimitConfig::from_env(),
            google,
            facebook,
            twitter,
            email,
        }
    }
}

pub fn init_app_state(pool: PgPool) -> AppState {
    let http = http_client();
    let transport = transport_from_config(&EmailConfig::from_env(), http.clone());

    AppState::from_env(
        Arc::new(PgAccountRepository::new(pool.clone())),
        Arc::new(PgRefreshTokenStore::new(pool)),
        transport,
        http,
    )
}

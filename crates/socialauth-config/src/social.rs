//! Third-party identity provider credentials.
//!
//! Empty strings mean "not configured". A missing Google client id makes
//! every Google login fail the audience check; missing Facebook app
//! credentials skip the `debug_token` step.

use std::env;

#[derive(Clone, Debug, Default)]
pub struct SocialConfig {
    pub google_client_id: String,
    pub facebook_app_id: String,
    pub facebook_app_secret: String,
    pub twitter_api_key: String,
    pub twitter_api_key_secret: String,
    pub twitter_callback_url: String,
    /// Placeholder credential stored (hashed) on every social account.
    pub social_secret: String,
}

impl SocialConfig {
    pub fn from_env() -> Self {
        Self {
            google_client_id: env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            facebook_app_id: env::var("FACEBOOK_APP_ID").unwrap_or_default(),
            facebook_app_secret: env::var("FACEBOOK_APP_SECRET").unwrap_or_default(),
            twitter_api_key: env::var("TWITTER_API_KEY").unwrap_or_default(),
            twitter_api_key_secret: env::var("TWITTER_API_KEY_SECRET").unwrap_or_default(),
            twitter_callback_url: env::var("TWITTER_CALLBACK_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "oob".to_string()),
            social_secret: env::var("SOCIAL_SECRET").unwrap_or_default(),
        }
    }

    pub fn facebook_app_configured(&self) -> bool {
        !self.facebook_app_id.is_empty() && !self.facebook_app_secret.is_empty()
    }
}

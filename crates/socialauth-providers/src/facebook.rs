use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use socialauth_models::AuthProvider;

use crate::error::ProviderError;
use crate::identity::{SocialIdentity, TokenVerifier};

pub const FACEBOOK_GRAPH_BASE_URL: &str = "https://graph.facebook.com";
pub const FACEBOOK_INVALID_TOKEN: &str = "The token is invalid or expired. Please try again.";

/// Verifies Facebook user access tokens against the Graph API.
///
/// When app credentials are configured the token is first inspected with
/// `debug_token` to make sure it was issued to this app.
#[derive(Debug, Clone)]
pub struct FacebookClient {
    http: reqwest::Client,
    base_url: String,
    app_id: String,
    app_secret: String,
}

#[derive(Debug, Deserialize)]
struct DebugTokenEnvelope {
    data: DebugTokenData,
}

#[derive(Debug, Deserialize)]
struct DebugTokenData {
    #[serde(default)]
    is_valid: bool,
    app_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    email: Option<String>,
    name: Option<String>,
}

impl FacebookClient {
    pub fn new(
        http: reqwest::Client,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: FACEBOOK_GRAPH_BASE_URL.to_string(),
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn invalid() -> ProviderError {
        ProviderError::InvalidCredential(FACEBOOK_INVALID_TOKEN.to_string())
    }

    fn app_configured(&self) -> bool {
        !self.app_id.is_empty() && !self.app_secret.is_empty()
    }

    async fn check_audience(&self, token: &str) -> Result<(), ProviderError> {
        let app_token = format!("{}|{}", self.app_id, self.app_secret);
        let response = self
            .http
            .get(format!("{}/debug_token", self.base_url))
            .query(&[("input_token", token), ("access_token", app_token.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "facebook debug_token rejected");
            return Err(Self::invalid());
        }

        let envelope: DebugTokenEnvelope = response
            .json()
            .await
            .map_err(|e| ProviderError::UnexpectedResponse(e.to_string()))?;

        if !envelope.data.is_valid {
            return Err(Self::invalid());
        }
        if envelope.data.app_id.as_deref() != Some(self.app_id.as_str()) {
            warn!(app_id = ?envelope.data.app_id, "facebook token issued for another app");
            return Err(ProviderError::AudienceMismatch);
        }
        Ok(())
    }
}

#[async_trait]
impl TokenVerifier for FacebookClient {
    fn provider(&self) -> AuthProvider {
        AuthProvider::Facebook
    }

    #[instrument(skip(self, token))]
    async fn verify(&self, token: &str) -> Result<SocialIdentity, ProviderError> {
        if self.app_configured() {
            self.check_audience(token).await?;
        }

        let response = self
            .http
            .get(format!("{}/me", self.base_url))
            .query(&[("fields", "id,name,email"), ("access_token", token)])
            .send()
            .await?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "facebook rejected access token");
            return Err(Self::invalid());
        }

        let profile: Profile = response
            .json()
            .await
            .map_err(|e| ProviderError::UnexpectedResponse(e.to_string()))?;

        let email = profile
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(Self::invalid)?;

        Ok(SocialIdentity {
            email,
            full_name: profile.name.unwrap_or_default(),
        })
    }
}

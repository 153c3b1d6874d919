use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use socialauth_models::AuthProvider;

use crate::error::ProviderError;
use crate::identity::{SocialIdentity, TokenVerifier};

pub const GOOGLE_TOKENINFO_BASE_URL: &str = "https://oauth2.googleapis.com";
pub const GOOGLE_INVALID_TOKEN: &str = "The token is invalid or expired. Please try again.";

const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Verifies Google ID tokens through the `tokeninfo` endpoint.
#[derive(Debug, Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    sub: Option<String>,
    aud: Option<String>,
    iss: Option<String>,
    email: Option<String>,
    name: Option<String>,
}

impl GoogleClient {
    pub fn new(http: reqwest::Client, client_id: impl Into<String>) -> Self {
        Self {
            http,
            base_url: GOOGLE_TOKENINFO_BASE_URL.to_string(),
            client_id: client_id.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn invalid() -> ProviderError {
        ProviderError::InvalidCredential(GOOGLE_INVALID_TOKEN.to_string())
    }
}

#[async_trait]
impl TokenVerifier for GoogleClient {
    fn provider(&self) -> AuthProvider {
        AuthProvider::Google
    }

    #[instrument(skip(self, token))]
    async fn verify(&self, token: &str) -> Result<SocialIdentity, ProviderError> {
        let response = self
            .http
            .get(format!("{}/tokeninfo", self.base_url))
            .query(&[("id_token", token)])
            .send()
            .await?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "google rejected id token");
            return Err(Self::invalid());
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| ProviderError::UnexpectedResponse(e.to_string()))?;

        if info.sub.is_none() {
            return Err(Self::invalid());
        }

        if self.client_id.is_empty() || info.aud.as_deref() != Some(self.client_id.as_str()) {
            warn!(aud = ?info.aud, "google id token issued for another client");
            return Err(ProviderError::AudienceMismatch);
        }

        if !info
            .iss
            .as_deref()
            .is_some_and(|iss| GOOGLE_ISSUERS.contains(&iss))
        {
            return Err(Self::invalid());
        }

        let email = info.email.filter(|e| !e.is_empty()).ok_or_else(Self::invalid)?;

        Ok(SocialIdentity {
            email,
            full_name: info.name.unwrap_or_default(),
        })
    }
}

//! Twitter three-legged OAuth 1.0a.
//!
//! 1. [`TwitterClient::request_token`] obtains a temporary token the client
//!    uses to send the user to Twitter's authorize page.
//! 2. After the user approves, the client posts back `oauth_token` and
//!    `oauth_verifier`; [`TwitterClient::verify`] trades them for an access
//!    token and reads the account's email with it.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::ProviderError;
use crate::identity::SocialIdentity;
use crate::oauth1::{OAuth1Signer, SignedRequest};

pub const TWITTER_BASE_URL: &str = "https://api.twitter.com";
pub const TWITTER_INVALID_TOKENS: &str = "The tokens are invalid or expired. Please try again.";

#[derive(Debug, Clone)]
pub struct TwitterClient {
    http: reqwest::Client,
    signer: OAuth1Signer,
    callback_url: String,
    oauth_base_url: String,
    api_base_url: String,
}

#[derive(Debug, Deserialize)]
struct Credentials {
    email: Option<String>,
    name: Option<String>,
}

fn parse_form(body: &str) -> BTreeMap<String, String> {
    url::form_urlencoded::parse(body.as_bytes())
        .into_owned()
        .collect()
}

impl TwitterClient {
    pub fn new(
        http: reqwest::Client,
        api_key: impl Into<String>,
        api_key_secret: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            signer: OAuth1Signer::new(api_key, api_key_secret),
            callback_url: callback_url.into(),
            oauth_base_url: TWITTER_BASE_URL.to_string(),
            api_base_url: TWITTER_BASE_URL.to_string(),
        }
    }

    /// Points both the OAuth and REST calls at `base_url`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        self.oauth_base_url = base_url.clone();
        self.api_base_url = base_url;
        self
    }

    fn invalid() -> ProviderError {
        ProviderError::InvalidCredential(TWITTER_INVALID_TOKENS.to_string())
    }

    /// Returns Twitter's form response (`oauth_token`,
    /// `oauth_token_secret`, `oauth_callback_confirmed`) as a map.
    #[instrument(skip(self))]
    pub async fn request_token(&self) -> Result<BTreeMap<String, String>, ProviderError> {
        let url = format!("{}/oauth/request_token", self.oauth_base_url);
        let authorization = self.signer.authorize(&SignedRequest {
            method: "POST",
            url: &url,
            oauth_extra: &[("oauth_callback", self.callback_url.as_str())],
            ..Default::default()
        })?;

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::UnexpectedResponse(format!(
                "request_token returned {}",
                status
            )));
        }

        let fields = parse_form(&body);
        if !fields.contains_key("oauth_token") {
            return Err(ProviderError::UnexpectedResponse(
                "request_token response has no oauth_token".to_string(),
            ));
        }
        Ok(fields)
    }

    #[instrument(skip_all)]
    pub async fn verify(
        &self,
        oauth_token: &str,
        oauth_verifier: &str,
    ) -> Result<SocialIdentity, ProviderError> {
        let (token, token_secret) = self.access_token(oauth_token, oauth_verifier).await?;

        let url = format!("{}/1.1/account/verify_credentials.json", self.api_base_url);
        let params = [("include_email", "true")];
        let authorization = self.signer.authorize(&SignedRequest {
            method: "GET",
            url: &url,
            params: &params,
            token: Some(token.as_str()),
            token_secret: &token_secret,
            oauth_extra: &[],
        })?;

        let response = self
            .http
            .get(&url)
            .query(&params)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .send()
            .await?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "twitter verify_credentials rejected");
            return Err(Self::invalid());
        }

        let credentials: Credentials = response
            .json()
            .await
            .map_err(|e| ProviderError::UnexpectedResponse(e.to_string()))?;

        let email = credentials
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(Self::invalid)?;

        Ok(SocialIdentity {
            email,
            full_name: credentials.name.unwrap_or_default(),
        })
    }

    async fn access_token(
        &self,
        oauth_token: &str,
        oauth_verifier: &str,
    ) -> Result<(String, String), ProviderError> {
        let url = format!("{}/oauth/access_token", self.oauth_base_url);
        let authorization = self.signer.authorize(&SignedRequest {
            method: "POST",
            url: &url,
            token: Some(oauth_token),
            oauth_extra: &[("oauth_verifier", oauth_verifier)],
            ..Default::default()
        })?;

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!(%status, "twitter access_token exchange rejected");
            return Err(Self::invalid());
        }

        let mut fields = parse_form(&body);
        match (
            fields.remove("oauth_token"),
            fields.remove("oauth_token_secret"),
        ) {
            (Some(token), Some(secret)) => Ok((token, secret)),
            _ => Err(Self::invalid()),
        }
    }
}

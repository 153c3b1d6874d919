//! OAuth 1.0a request signing (RFC 5849, HMAC-SHA1).

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::{Rng, distributions::Alphanumeric};
use sha1::Sha1;

use crate::error::ProviderError;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters stay literal; everything else is escaped.
const RFC3986: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, RFC3986).to_string()
}

/// Consumer (application) credentials.
#[derive(Clone, Debug)]
pub struct OAuth1Signer {
    consumer_key: String,
    consumer_secret: String,
}

/// The request being signed. `url` excludes the query string; query and
/// form parameters go in `params`.
#[derive(Debug, Default)]
pub struct SignedRequest<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub params: &'a [(&'a str, &'a str)],
    pub token: Option<&'a str>,
    pub token_secret: &'a str,
    /// Additional `oauth_*` protocol parameters such as `oauth_callback`.
    pub oauth_extra: &'a [(&'a str, &'a str)],
}

impl OAuth1Signer {
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        }
    }

    /// Builds the `Authorization` header value with a fresh nonce and timestamp.
    pub fn authorize(&self, request: &SignedRequest<'_>) -> Result<String, ProviderError> {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let timestamp = Utc::now().timestamp().to_string();
        self.authorize_with(request, &nonce, &timestamp)
    }

    pub fn authorize_with(
        &self,
        request: &SignedRequest<'_>,
        nonce: &str,
        timestamp: &str,
    ) -> Result<String, ProviderError> {
        let mut oauth: Vec<(&str, &str)> = vec![
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp),
            ("oauth_version", "1.0"),
        ];
        if let Some(token) = request.token {
            oauth.push(("oauth_token", token));
        }
        oauth.extend_from_slice(request.oauth_extra);

        let signature = self.signature(request, &oauth)?;
        oauth.push(("oauth_signature", signature.as_str()));
        oauth.sort();

        let fields = oauth
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("OAuth {}", fields))
    }

    fn signature(
        &self,
        request: &SignedRequest<'_>,
        oauth: &[(&str, &str)],
    ) -> Result<String, ProviderError> {
        let base = signature_base_string(request.method, request.url, request.params, oauth);
        let key = format!(
            "{}&{}",
            percent_encode(&self.consumer_secret),
            percent_encode(request.token_secret)
        );

        let mut mac = HmacSha1::new_from_slice(key.as_bytes())
            .map_err(|e| ProviderError::UnexpectedResponse(format!("signing key: {}", e)))?;
        mac.update(base.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

fn signature_base_string(
    method: &str,
    url: &str,
    params: &[(&str, &str)],
    oauth: &[(&str, &str)],
) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .chain(oauth.iter())
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&normalized)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference request from Twitter's "Creating a signature" guide.
    const CONSUMER_KEY: &str = "xvz1evFS4wEEPTGEFPHBog";
    const CONSUMER_SECRET: &str = "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw";
    const TOKEN: &str = "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb";
    const TOKEN_SECRET: &str = "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE";
    const NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
    const TIMESTAMP: &str = "1318622958";
    const URL: &str = "https://api.twitter.com/1.1/statuses/update.json";
    const PARAMS: &[(&str, &str)] = &[
        ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
        ("include_entities", "true"),
    ];

    fn reference_request() -> SignedRequest<'static> {
        SignedRequest {
            method: "POST",
            url: URL,
            params: PARAMS,
            token: Some(TOKEN),
            token_secret: TOKEN_SECRET,
            oauth_extra: &[],
        }
    }

    #[test]
    fn percent_encoding_follows_rfc3986() {
        assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(percent_encode("a-b.c_d~e"), "a-b.c_d~e");
        assert_eq!(percent_encode("An encoded string!"), "An%20encoded%20string%21");
        assert_eq!(percent_encode("☃"), "%E2%98%83");
    }

    #[test]
    fn base_string_matches_reference() {
        let oauth = [
            ("oauth_consumer_key", CONSUMER_KEY),
            ("oauth_nonce", NONCE),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", TIMESTAMP),
            ("oauth_token", TOKEN),
            ("oauth_version", "1.0"),
        ];
        let base = signature_base_string("post", URL, PARAMS, &oauth);

        assert!(base.starts_with(
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&include_entities%3Dtrue%26oauth_consumer_key%3D"
        ));
        assert!(base.ends_with(
            "status%3DHello%2520Ladies%2520%252B%2520Gentlemen%252C%2520a%2520signed%2520OAuth%2520request%2521"
        ));
    }

    #[test]
    fn signature_matches_reference_vector() {
        let signer = OAuth1Signer::new(CONSUMER_KEY, CONSUMER_SECRET);
        let header = signer
            .authorize_with(&reference_request(), NONCE, TIMESTAMP)
            .unwrap();

        assert!(header.starts_with("OAuth "));
        assert!(header.contains(r#"oauth_signature="hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D""#));
        assert!(header.contains(r#"oauth_token="370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb""#));
    }

    #[test]
    fn extra_protocol_parameters_are_signed_and_sent() {
        let signer = OAuth1Signer::new(CONSUMER_KEY, CONSUMER_SECRET);
        let request = SignedRequest {
            method: "POST",
            url: "https://api.twitter.com/oauth/request_token",
            oauth_extra: &[("oauth_callback", "oob")],
            ..Default::default()
        };

        let header = signer.authorize_with(&request, NONCE, TIMESTAMP).unwrap();
        assert!(header.contains(r#"oauth_callback="oob""#));
        assert!(!header.contains("oauth_token="));
    }

    #[test]
    fn fresh_nonces_differ() {
        let signer = OAuth1Signer::new(CONSUMER_KEY, CONSUMER_SECRET);
        let a = signer.authorize(&reference_request()).unwrap();
        let b = signer.authorize(&reference_request()).unwrap();
        assert_ne!(a, b);
    }
}

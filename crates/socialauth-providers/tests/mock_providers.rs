use serde_json::json;
use socialauth_providers::{
    FacebookClient, GoogleClient, ProviderError, TokenVerifier, TwitterClient,
};
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CLIENT_ID: &str = "client-123.apps.googleusercontent.com";

fn google(server: &MockServer) -> GoogleClient {
    GoogleClient::new(reqwest::Client::new(), CLIENT_ID).with_base_url(server.uri())
}

#[tokio::test]
async fn google_valid_token_yields_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tokeninfo"))
        .and(query_param("id_token", "good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "1234",
            "aud": CLIENT_ID,
            "iss": "https://accounts.google.com",
            "email": "ana@x.com",
            "name": "Ana Lopez"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let identity = google(&server).verify("good").await.unwrap();
    assert_eq!(identity.email, "ana@x.com");
    assert_eq!(identity.full_name, "Ana Lopez");
}

#[tokio::test]
async fn google_audience_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tokeninfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "1234",
            "aud": "someone-else",
            "iss": "accounts.google.com",
            "email": "ana@x.com"
        })))
        .mount(&server)
        .await;

    let err = google(&server).verify("token").await.unwrap_err();
    assert!(matches!(err, ProviderError::AudienceMismatch));
}

#[tokio::test]
async fn google_unconfigured_client_id_is_an_audience_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tokeninfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "1234",
            "aud": "",
            "iss": "accounts.google.com",
            "email": "ana@x.com"
        })))
        .mount(&server)
        .await;

    let client = GoogleClient::new(reqwest::Client::new(), "").with_base_url(server.uri());
    let err = client.verify("token").await.unwrap_err();
    assert!(matches!(err, ProviderError::AudienceMismatch));
}

#[tokio::test]
async fn google_rejected_token_is_invalid_credential() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tokeninfo"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_token"})),
        )
        .mount(&server)
        .await;

    let err = google(&server).verify("expired").await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidCredential(_)));
}

#[tokio::test]
async fn google_foreign_issuer_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tokeninfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "1234",
            "aud": CLIENT_ID,
            "iss": "https://evil.example",
            "email": "ana@x.com"
        })))
        .mount(&server)
        .await;

    let err = google(&server).verify("token").await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidCredential(_)));
}

#[tokio::test]
async fn google_unreachable_is_transport_error() {
    let client = GoogleClient::new(reqwest::Client::new(), CLIENT_ID)
        .with_base_url("http://127.0.0.1:1");
    let err = client.verify("token").await.unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)));
}

#[tokio::test]
async fn facebook_profile_without_app_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(query_param("fields", "id,name,email"))
        .and(query_param("access_token", "fb-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "99",
            "name": "Ana Lopez",
            "email": "ana@x.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = FacebookClient::new(reqwest::Client::new(), "", "").with_base_url(server.uri());
    let identity = client.verify("fb-token").await.unwrap();
    assert_eq!(identity.email, "ana@x.com");
}

#[tokio::test]
async fn facebook_token_for_other_app_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/debug_token"))
        .and(query_param("access_token", "app-1|secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"is_valid": true, "app_id": "app-2"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"email": "a@x.com"})))
        .expect(0)
        .mount(&server)
        .await;

    let client = FacebookClient::new(reqwest::Client::new(), "app-1", "secret")
        .with_base_url(server.uri());
    let err = client.verify("fb-token").await.unwrap_err();
    assert!(matches!(err, ProviderError::AudienceMismatch));
}

#[tokio::test]
async fn facebook_profile_without_email_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "99", "name": "Ana"})))
        .mount(&server)
        .await;

    let client = FacebookClient::new(reqwest::Client::new(), "", "").with_base_url(server.uri());
    let err = client.verify("fb-token").await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidCredential(_)));
}

fn twitter(server: &MockServer) -> TwitterClient {
    TwitterClient::new(reqwest::Client::new(), "key", "secret", "oob").with_base_url(server.uri())
}

#[tokio::test]
async fn twitter_request_token_returns_form_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "oauth_token=req-token&oauth_token_secret=req-secret&oauth_callback_confirmed=true",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let fields = twitter(&server).request_token().await.unwrap();
    assert_eq!(fields["oauth_token"], "req-token");
    assert_eq!(fields["oauth_callback_confirmed"], "true");
}

#[tokio::test]
async fn twitter_login_exchanges_verifier_and_reads_email() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "oauth_token=acc-token&oauth_token_secret=acc-secret&user_id=1&screen_name=ana",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1.1/account/verify_credentials.json"))
        .and(query_param("include_email", "true"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id_str": "1",
            "name": "Ana Lopez",
            "email": "ana@x.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let identity = twitter(&server).verify("req-token", "verifier").await.unwrap();
    assert_eq!(identity.email, "ana@x.com");
    assert_eq!(identity.full_name, "Ana Lopez");
}

#[tokio::test]
async fn twitter_rejected_verifier_is_invalid_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid request token."))
        .mount(&server)
        .await;

    let err = twitter(&server).verify("bad", "bad").await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidCredential(_)));
}

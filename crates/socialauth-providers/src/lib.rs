//! # SocialAuth Providers
//!
//! Clients that turn a third-party credential into a [`SocialIdentity`]:
//!
//! - [`google`]: ID tokens via `tokeninfo`
//! - [`facebook`]: user access tokens via the Graph API
//! - [`twitter`]: OAuth 1.0a token/verifier pairs
//! - [`oauth1`]: RFC 5849 request signing used by the Twitter client
//!
//! Every client takes its base URL from a constant that can be replaced
//! with `with_base_url`, which is how the tests talk to a mock server.

pub mod error;
pub mod facebook;
pub mod google;
pub mod identity;
pub mod oauth1;
pub mod twitter;

pub use error::ProviderError;
pub use facebook::FacebookClient;
pub use google::GoogleClient;
pub use identity::{SocialIdentity, TokenVerifier};
pub use twitter::TwitterClient;

//! # SocialAuth Auth
//!
//! Token primitives for the SocialAuth API:
//!
//! - [`claims`]: claim structures and the [`TokenPair`] session type
//! - [`jwt`]: access, refresh and email verification tokens
//! - [`reset_token`]: HMAC password reset links and uid encoding
//!
//! ```ignore
//! use socialauth_auth::{create_token_pair, make_reset_token, encode_uid};
//!
//! let pair = create_token_pair(account.id, &account.email, &jwt_config)?;
//! let link = format!("/user/password-reset/{}/{}", encode_uid(account.id),
//!     make_reset_token(account.id, &account.password_hash, &jwt_config)?);
//! ```

pub mod claims;
pub mod jwt;
pub mod reset_token;

pub use claims::{Claims, EmailVerificationClaims, TokenPair, TokenType};
pub use jwt::{
    create_access_token, create_email_verification_token, create_refresh_token,
    create_token_pair, verify_email_verification_token, verify_refresh_token, verify_token,
};
pub use reset_token::{check_reset_token, decode_uid, encode_uid, make_reset_token};

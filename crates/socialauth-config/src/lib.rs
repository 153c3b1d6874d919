//! # SocialAuth Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`app`]: server address and public URLs
//! - [`jwt`]: signing secret and token lifetimes
//! - [`email`]: outbound mail backend
//! - [`social`]: Google, Facebook and Twitter credentials
//! - [`cors`]: allowed origins
//! - [`rate_limit`]: per-IP request limits
//!
//! ```ignore
//! use socialauth_config::{AppConfig, JwtConfig, SocialConfig};
//!
//! let app = AppConfig::from_env();
//! let jwt = JwtConfig::from_env();
//! let social = SocialConfig::from_env();
//! ```

pub mod app;
pub mod cors;
pub mod email;
pub mod jwt;
pub mod rate_limit;
pub mod social;

pub use app::AppConfig;
pub use cors::CorsConfig;
pub use email::{EmailBackend, EmailConfig};
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
pub use social::SocialConfig;

//! # SocialAuth API
//!
//! User accounts and social login for mobile and web clients, built with
//! Axum and PostgreSQL. Every successful sign-in, local or third-party,
//! ends with the same JWT access/refresh token pair.
//!
//! ## Features
//!
//! - **Local accounts**: registration, email verification, email/password sign-in
//! - **Social sign-in**: Google ID tokens, Facebook access tokens, Twitter OAuth 1.0a
//! - **Sessions**: HS256 access and refresh tokens, single-use refresh rotation
//! - **Password management**: change, and reset through an emailed HMAC link
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── middleware/       # AuthUser bearer-token extractor
//! ├── modules/          # Feature modules
//! │   ├── users/       # /user endpoints
//! │   └── social/      # /social endpoints
//! └── utils/           # Email composition and delivery queue
//! ```
//!
//! Domain logic that does not need HTTP lives in the workspace crates:
//! `socialauth-core` (errors, passwords), `socialauth-config`,
//! `socialauth-auth` (tokens), `socialauth-models`, `socialauth-db`
//! (repositories) and `socialauth-providers` (identity provider clients).
//!
//! ## Account linking
//!
//! A third-party identity is matched to a local account by email. The first
//! sign-in creates a verified account tagged with the provider; later
//! sign-ins through a *different* provider are refused with
//! `Please continue your login using <provider>`.
//!
//! ## API Documentation
//!
//! When the server is running:
//!
//! - Swagger UI: `http://localhost:8000/swagger-ui`
//! - Scalar: `http://localhost:8000/scalar`

pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod utils;
pub mod validator;

// Re-export workspace crates for convenience
pub use socialauth_auth;
pub use socialauth_config;
pub use socialauth_core;
pub use socialauth_db;
pub use socialauth_models;
pub use socialauth_providers;

//! # SocialAuth Models
//!
//! Domain types and DTOs for the SocialAuth API.
//!
//! - [`accounts`]: the [`Account`] entity and [`AuthProvider`] tag
//! - [`handle`]: handle derivation and field validators
//! - [`users`]: `/user` request and response bodies
//! - [`social`]: `/social` request bodies

pub mod accounts;
pub mod handle;
pub mod social;
pub mod users;

pub use accounts::{Account, AuthProvider, NewAccount};
pub use socialauth_auth::{Claims, TokenPair};
pub use social::{SocialTokenRequest, TwitterLoginRequest};
pub use users::{
    ChangePasswordRequest, CurrentUserResponse, EmailVerifyQuery, LoginRequest, MessageResponse,
    RefreshTokenRequest, RegisterRequest, RegisterResponse, ResetCheckQuery, ResetCompleteRequest,
    ResetEmailRequest, UpdateCurrentUserRequest,
};

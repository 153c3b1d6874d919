//! Request extractors.
//!
//! - [`auth`]: `AuthUser`, which requires `Authorization: Bearer <access token>`

pub mod auth;

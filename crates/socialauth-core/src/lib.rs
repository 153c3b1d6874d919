//! # SocialAuth Core
//!
//! Shared primitives for the SocialAuth API:
//!
//! - [`errors`]: the [`AppError`] type and its HTTP mapping
//! - [`password`]: bcrypt hashing and the password strength rule
//!
//! ```ignore
//! use socialauth_core::{AppError, hash_password};
//!
//! let hash = hash_password("abc12345")?;
//! return Err(AppError::unauthorized("Invalid credentials"));
//! ```

pub mod errors;
pub mod password;

pub use errors::{AppError, ErrorKind};
pub use password::{hash_password, validate_password_strength, verify_password};

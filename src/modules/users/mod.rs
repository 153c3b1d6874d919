//! Local accounts: registration, email/password sessions, email
//! verification, password change and reset, and the current-user profile.

pub mod controller;
pub mod router;
pub mod service;

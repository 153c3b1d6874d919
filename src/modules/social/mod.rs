//! Sign-in with Google, Facebook and Twitter.

pub mod controller;
pub mod router;
pub mod service;

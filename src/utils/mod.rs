//! Outbound email.
//!
//! - [`email`]: account email composition and templates
//! - [`mailer`]: delivery queue and transports (SMTP, SendGrid, log)

pub mod email;
pub mod mailer;

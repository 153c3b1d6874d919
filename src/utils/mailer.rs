//! Outbound mail queue.
//!
//! Handlers never wait for delivery. They push an [`OutgoingEmail`] onto an
//! unbounded channel; a single background worker hands each message to the
//! configured [`EmailTransport`]. Failures are logged and counted, never
//! retried.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

use socialauth_config::{EmailBackend, EmailConfig};
use socialauth_core::AppError;

use crate::metrics::{track_email_failed, track_email_sent};

pub const SENDGRID_BASE_URL: &str = "https://api.sendgrid.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

#[async_trait]
pub trait EmailTransport: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, email: &OutgoingEmail) -> Result<(), AppError>;
}

pub struct SmtpMailTransport {
    config: EmailConfig,
}

impl SmtpMailTransport {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn mailer(&self) -> Result<SmtpTransport, AppError> {
        if self.config.smtp_username.is_empty() {
            return Ok(SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build());
        }

        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        Ok(SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| AppError::internal_error(format!("Failed to create SMTP relay: {}", e)))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build())
    }
}

#[async_trait]
impl EmailTransport for SmtpMailTransport {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), AppError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let message = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| AppError::internal_error(format!("Invalid from email: {}", e)))?,
            )
            .to(email
                .to
                .parse()
                .map_err(|e| AppError::internal_error(format!("Invalid to email: {}", e)))?)
            .subject(email.subject.as_str())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(email.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(email.html_body.clone()),
                    ),
            )
            .map_err(|e| AppError::internal_error(format!("Failed to build email: {}", e)))?;

        let mailer = self.mailer()?;

        tokio::task::spawn_blocking(move || mailer.send(&message))
            .await
            .map_err(|e| AppError::internal_error(format!("Task join error: {}", e)))?
            .map_err(|e| AppError::internal_error(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

/// SendGrid v3 `mail/send`.
pub struct SendGridTransport {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    from_email: String,
    from_name: String,
}

impl SendGridTransport {
    pub fn new(http: reqwest::Client, config: &EmailConfig) -> Self {
        Self {
            http,
            base_url: SENDGRID_BASE_URL.to_string(),
            api_key: config.sendgrid_api_key.clone(),
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl EmailTransport for SendGridTransport {
    fn name(&self) -> &'static str {
        "sendgrid"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), AppError> {
        let body = json!({
            "personalizations": [{ "to": [{ "email": email.to }] }],
            "from": { "email": self.from_email, "name": self.from_name },
            "subject": email.subject,
            "content": [
                { "type": "text/plain", "value": email.text_body },
                { "type": "text/html", "value": email.html_body },
            ],
        });

        let response = self
            .http
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::internal_error(format!(
                "SendGrid returned {}: {}",
                status, detail
            )));
        }
        Ok(())
    }
}

/// Writes messages to the log. The default backend for development.
pub struct LogTransport;

#[async_trait]
impl EmailTransport for LogTransport {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), AppError> {
        info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.text_body,
            "email (log backend)"
        );
        Ok(())
    }
}

pub fn transport_from_config(
    config: &EmailConfig,
    http: reqwest::Client,
) -> Arc<dyn EmailTransport> {
    match config.backend {
        EmailBackend::Smtp => Arc::new(SmtpMailTransport::new(config.clone())),
        EmailBackend::SendGrid => Arc::new(SendGridTransport::new(http, config)),
        EmailBackend::Log => Arc::new(LogTransport),
    }
}

#[derive(Clone, Debug)]
pub struct EmailDispatcher {
    sender: mpsc::UnboundedSender<OutgoingEmail>,
}

impl EmailDispatcher {
    /// Starts the delivery worker. Must be called inside a Tokio runtime.
    pub fn spawn(transport: Arc<dyn EmailTransport>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<OutgoingEmail>();

        tokio::spawn(async move {
            while let Some(email) = receiver.recv().await {
                deliver(transport.as_ref(), &email).await;
            }
            debug!("email queue closed");
        });

        Self { sender }
    }

    #[cfg(test)]
    pub(crate) fn from_sender(sender: mpsc::UnboundedSender<OutgoingEmail>) -> Self {
        Self { sender }
    }

    /// Queues `email` for delivery. Returns immediately.
    pub fn enqueue(&self, email: OutgoingEmail) {
        if let Err(e) = self.sender.send(email) {
            error!(to = %e.0.to, "email queue closed, dropping message");
            track_email_failed("queue_closed");
        }
    }
}

#[instrument(skip_all, fields(transport = transport.name(), to = %email.to, subject = %email.subject))]
async fn deliver(transport: &dyn EmailTransport, email: &OutgoingEmail) {
    match transport.send(email).await {
        Ok(()) => {
            debug!("email delivered");
            track_email_sent(transport.name());
        }
        Err(e) => {
            error!(error = %e.error, "email delivery failed");
            track_email_failed(transport.name());
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryTransport;

#[cfg(any(test, feature = "test-utils"))]
mod memory {
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use socialauth_core::AppError;

    use super::{EmailTransport, OutgoingEmail};

    /// Keeps every delivered message so tests can read links out of them.
    #[derive(Default)]
    pub struct MemoryTransport {
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    impl MemoryTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn sent(&self) -> Vec<OutgoingEmail> {
            self.sent.lock().await.clone()
        }

        /// Waits up to two seconds for the `count`-th message to `to`.
        pub async fn wait_for(&self, to: &str, count: usize) -> Option<OutgoingEmail> {
            for _ in 0..200 {
                let matching: Vec<_> = self
                    .sent
                    .lock()
                    .await
                    .iter()
                    .filter(|e| e.to == to)
                    .cloned()
                    .collect();
                if matching.len() >= count {
                    return matching.into_iter().nth(count - 1);
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            None
        }
    }

    #[async_trait]
    impl EmailTransport for MemoryTransport {
        fn name(&self) -> &'static str {
            "memory"
        }

        async fn send(&self, email: &OutgoingEmail) -> Result<(), AppError> {
            self.sent.lock().await.push(email.clone());
            Ok(())
        }
    }
}

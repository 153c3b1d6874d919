use std::env;

/// Which transport delivers outbound mail.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum EmailBackend {
    Smtp,
    SendGrid,
    /// Writes messages to the log instead of sending them.
    #[default]
    Log,
}

impl EmailBackend {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "smtp" => EmailBackend::Smtp,
            "sendgrid" => EmailBackend::SendGrid,
            _ => EmailBackend::Log,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub backend: EmailBackend,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub sendgrid_api_key: String,
    pub from_email: String,
    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            backend: EmailBackend::Log,
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            sendgrid_api_key: String::new(),
            from_email: "noreply@socialauth.local".to_string(),
            from_name: "SocialAuth".to_string(),
        }
    }
}

impl EmailConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend: env::var("EMAIL_BACKEND")
                .map(|v| EmailBackend::parse(&v))
                .unwrap_or_default(),
            smtp_host: env::var("SMTP_HOST").unwrap_or(defaults.smtp_host),
            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.smtp_port),
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            sendgrid_api_key: env::var("SENDGRID_API_KEY").unwrap_or_default(),
            from_email: env::var("FROM_EMAIL").unwrap_or(defaults.from_email),
            from_name: env::var("FROM_NAME").unwrap_or(defaults.from_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parsing_falls_back_to_log() {
        assert_eq!(EmailBackend::parse("SMTP"), EmailBackend::Smtp);
        assert_eq!(EmailBackend::parse("sendgrid"), EmailBackend::SendGrid);
        assert_eq!(EmailBackend::parse("carrier-pigeon"), EmailBackend::Log);
    }
}

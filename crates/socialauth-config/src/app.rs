use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_addr: String,
    /// Public base URL of this API; verification links point here.
    pub base_url: String,
    /// Fallback redirect target for password reset links.
    pub frontend_url: String,
    /// Custom URI scheme accepted in reset redirects (mobile deep links).
    pub app_scheme: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_addr: "0.0.0.0:8000".to_string(),
            base_url: "http://localhost:8000".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            app_scheme: String::new(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or(defaults.server_addr),
            base_url: env::var("APP_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            app_scheme: env::var("APP_SCHEME").unwrap_or_default(),
        }
    }

    /// Schemes a password reset redirect may use.
    pub fn allowed_redirect_schemes(&self) -> Vec<&str> {
        let mut schemes = vec!["http", "https"];
        if !self.app_scheme.is_empty() {
            schemes.push(self.app_scheme.as_str());
        }
        schemes
    }
}

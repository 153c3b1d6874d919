use socialauth_core::AppError;
use thiserror::Error;

pub const AUDIENCE_MISMATCH: &str = "oops, who are you?";

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider rejected the credential or it has expired.
    #[error("{0}")]
    InvalidCredential(String),

    /// The credential was issued for another application.
    #[error("oops, who are you?")]
    AudienceMismatch,

    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected identity provider response: {0}")]
    UnexpectedResponse(String),
}

impl ProviderError {
    pub fn into_app_error(self) -> AppError {
        match self {
            ProviderError::InvalidCredential(message) => AppError::invalid_credential(message),
            ProviderError::AudienceMismatch => AppError::unauthorized(AUDIENCE_MISMATCH),
            other @ (ProviderError::Transport(_) | ProviderError::UnexpectedResponse(_)) => {
                AppError::upstream(other)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socialauth_core::ErrorKind;

    #[test]
    fn maps_onto_http_error_kinds() {
        let err = ProviderError::InvalidCredential("nope".into()).into_app_error();
        assert_eq!(err.kind, ErrorKind::InvalidCredential);
        assert_eq!(err.error.to_string(), "nope");

        let err = ProviderError::AudienceMismatch.into_app_error();
        assert_eq!(err.kind, ErrorKind::AuthenticationFailed);
        assert_eq!(err.error.to_string(), AUDIENCE_MISMATCH);

        let err = ProviderError::UnexpectedResponse("html".into()).into_app_error();
        assert_eq!(err.kind, ErrorKind::Upstream);
    }
}

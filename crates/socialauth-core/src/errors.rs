use std::collections::BTreeMap;

use anyhow::{Error, anyhow};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use validator::ValidationErrors;

/// Failure categories exposed over HTTP. Each maps to one status code and a
/// stable machine-readable `code` in the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    Validation,
    AuthenticationFailed,
    InvalidCredential,
    TokenExpired,
    TokenInvalid,
    NotFound,
    Upstream,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::BadRequest
            | ErrorKind::InvalidCredential
            | ErrorKind::TokenExpired
            | ErrorKind::TokenInvalid => StatusCode::BAD_REQUEST,
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::Validation => "validation_error",
            ErrorKind::AuthenticationFailed => "authentication_failed",
            ErrorKind::InvalidCredential => "invalid_credential",
            ErrorKind::TokenExpired => "token_expired",
            ErrorKind::TokenInvalid => "token_invalid",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Upstream => "upstream_error",
            ErrorKind::Internal => "internal_error",
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub error: Error,
    /// Field name -> messages, rendered under `errors`.
    pub details: Option<Value>,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            kind,
            error: err.into(),
            details: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, anyhow!(message.into()))
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::NotFound, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::BadRequest, err)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthenticationFailed, anyhow!(message.into()))
    }

    pub fn invalid_credential(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCredential, anyhow!(message.into()))
    }

    pub fn token_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenExpired, anyhow!(message.into()))
    }

    pub fn token_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenInvalid, anyhow!(message.into()))
    }

    pub fn upstream<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Upstream, err)
    }

    /// A 422 carrying a single message, attributed to `field`.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: ErrorKind::Validation,
            error: anyhow!(message.clone()),
            details: Some(json!({ field: [message] })),
        }
    }

    /// A 422 without a field attribution.
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, anyhow!(message.into()))
    }

    pub fn validation(errors: &ValidationErrors) -> Self {
        let fields = field_messages(errors);
        let summary = fields
            .values()
            .flatten()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            kind: ErrorKind::Validation,
            error: anyhow!(summary),
            details: Some(json!(fields)),
        }
    }
}

fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if self.kind == ErrorKind::Internal {
            tracing::error!(error = ?self.error, "internal server error");
            "Internal server error".to_string()
        } else {
            self.error.to_string()
        };

        let mut body = json!({
            "message": message,
            "code": self.kind.code(),
        });
        if let Some(details) = self.details {
            body["errors"] = details;
        }

        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

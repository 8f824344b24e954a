//! Errors returned by admin handlers
//!
//! Every variant renders as a JSON body `{"error": "..."}` with a status
//! code; invalid forms also carry the per-field messages under `errors`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::email::EmailError;
use crate::forms::FormErrors;
use crate::mailer::MailerError;
use crate::store::StoreError;
use crate::template::{CompileError, RegistryError};

/// Admin handler error
#[derive(Debug, Error)]
pub enum AdminError {
    /// Malformed input (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Form fields failed validation (400)
    #[error("Invalid form")]
    InvalidForm(FormErrors),

    /// Template did not compile (400)
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Unknown template, layout or record (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// No staff identity on the request (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Record store failure (500)
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Delivery failure (500)
    #[error(transparent)]
    Email(EmailError),

    /// Anything else (500)
    #[error("Server error: {0}")]
    Internal(String),
}

impl AdminError {
    /// HTTP status for this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::InvalidForm(_) | Self::Compile(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Store(_) | Self::Email(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<RegistryError> for AdminError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::TemplateNotFound(_) | RegistryError::LayoutNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            _ => Self::Internal(err.to_string()),
        }
    }
}

impl From<EmailError> for AdminError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::InvalidAddress(_) | EmailError::NoRecipients => {
                Self::BadRequest(err.to_string())
            }
            _ => Self::Email(err),
        }
    }
}

impl From<MailerError> for AdminError {
    fn from(err: MailerError) -> Self {
        match err {
            MailerError::Registry(e) => e.into(),
            MailerError::Store(e) => e.into(),
            MailerError::Compile(e) => e.into(),
            MailerError::Email(e) => e.into(),
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Admin request failed");
        }

        let body = match self {
            Self::InvalidForm(errors) => json!({ "error": "Invalid form", "errors": errors }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AdminError::from(RegistryError::TemplateNotFound("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AdminError::from(CompileError::MissingVariable("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AdminError::Unauthorized("no staff identity".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AdminError::from(EmailError::smtp("down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AdminError::from(EmailError::InvalidAddress("spam".into())).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_mailer_errors_keep_their_meaning() {
        let err = AdminError::from(MailerError::Registry(RegistryError::LayoutNotFound(
            "fancy".into(),
        )));
        assert!(matches!(err, AdminError::NotFound(_)));

        let err = AdminError::from(MailerError::Compile(CompileError::MissingVariable("x".into())));
        assert!(matches!(err, AdminError::Compile(_)));
    }

    #[test]
    fn test_response_status() {
        let response = AdminError::NotFound("template `x`".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

//! Email error types

use thiserror::Error;

/// Errors raised while building or delivering an email
#[derive(Debug, Error)]
pub enum EmailError {
    /// No To recipient
    #[error("email must have at least one recipient")]
    NoRecipients,

    /// No From address
    #[error("email must have a from address")]
    NoSender,

    /// No subject line
    #[error("email must have a subject")]
    NoSubject,

    /// No HTML body
    #[error("email must have HTML content")]
    NoContent,

    /// An address could not be parsed as a mailbox
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// SMTP transport failure
    #[error("SMTP error: {0}")]
    Smtp(String),

    /// Backend misconfiguration
    #[error("email configuration error: {0}")]
    Config(String),
}

impl EmailError {
    /// Create an SMTP error from a message
    #[must_use]
    pub fn smtp<T: Into<String>>(msg: T) -> Self {
        Self::Smtp(msg.into())
    }

    /// Create a configuration error from a message
    #[must_use]
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }
}

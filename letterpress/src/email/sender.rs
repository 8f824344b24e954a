//! Delivery trait implemented by every backend

use async_trait::async_trait;

use super::{Email, EmailError};

/// Delivers [`Email`]s
///
/// Implemented by [`ConsoleBackend`](super::ConsoleBackend),
/// [`SmtpBackend`](super::SmtpBackend) and the recording sender in
/// [`testing`](crate::testing).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver one email
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] if the email is incomplete or delivery fails.
    async fn send(&self, email: Email) -> Result<(), EmailError>;
}

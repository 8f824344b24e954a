//! Logging backend for development

use async_trait::async_trait;
use tracing::{debug, info};

use crate::email::{Email, EmailError, EmailSender};

/// Logs emails instead of delivering them
///
/// Selected with `mail.backend = "console"`. With [`ConsoleBackend::verbose`]
/// the HTML body is logged as well, which is handy when checking test sends
/// without a mail server.
#[derive(Debug, Clone, Default)]
pub struct ConsoleBackend {
    verbose: bool,
}

impl ConsoleBackend {
    /// Log sender, recipients and subject only
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also log the HTML body
    #[must_use]
    pub const fn verbose() -> Self {
        Self { verbose: true }
    }
}

#[async_trait]
impl EmailSender for ConsoleBackend {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        email.validate()?;

        info!(
            from = email.from.as_deref().unwrap_or_default(),
            to = ?email.to,
            subject = email.subject.as_deref().unwrap_or_default(),
            "Console email sent"
        );

        if self.verbose {
            debug!(
                html = email.html.as_deref().unwrap_or_default(),
                "Email content"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sends_complete_email() {
        let email = Email::new()
            .to("ada@example.com")
            .from("noreply@example.com")
            .subject("Hello")
            .html("<p>Hi</p>");
        assert!(ConsoleBackend::verbose().send(email).await.is_ok());
    }

    #[tokio::test]
    async fn test_rejects_incomplete_email() {
        let email = Email::new().from("noreply@example.com").subject("Hello");
        let err = ConsoleBackend::new().send(email).await.unwrap_err();
        assert!(matches!(err, EmailError::NoRecipients));
    }
}

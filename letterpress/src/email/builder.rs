//! Email message builder

use serde::{Deserialize, Serialize};

use super::EmailError;
use crate::template::CompiledEmail;

/// An outgoing email
///
/// Addresses are kept as strings in mailbox syntax (`Name <addr>` or a bare
/// address); backends parse them when delivering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    /// Recipients
    pub to: Vec<String>,

    /// Sender
    pub from: Option<String>,

    /// Subject line
    pub subject: Option<String>,

    /// HTML body
    pub html: Option<String>,
}

impl Email {
    /// Create an empty email
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Address a compiled template to its recipient
    ///
    /// ```rust
    /// use letterpress::email::Email;
    /// use letterpress::template::CompiledEmail;
    ///
    /// let compiled = CompiledEmail {
    ///     recipient: "ada@example.com".into(),
    ///     subject: "Hi".into(),
    ///     html: "<p>Hi</p>".into(),
    /// };
    /// let email = Email::from_compiled(&compiled);
    /// assert_eq!(email.to, vec!["ada@example.com"]);
    /// ```
    #[must_use]
    pub fn from_compiled(compiled: &CompiledEmail) -> Self {
        Self::new()
            .to(&compiled.recipient)
            .subject(&compiled.subject)
            .html(&compiled.html)
    }

    /// Add a recipient
    #[must_use]
    pub fn to(mut self, address: &str) -> Self {
        self.to.push(address.to_string());
        self
    }

    /// Set the sender
    #[must_use]
    pub fn from(mut self, address: &str) -> Self {
        self.from = Some(address.to_string());
        self
    }

    /// Set the subject
    #[must_use]
    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    /// Set the HTML body
    #[must_use]
    pub fn html(mut self, body: &str) -> Self {
        self.html = Some(body.to_string());
        self
    }

    /// Check that the required parts are present
    ///
    /// # Errors
    ///
    /// Returns the first missing part: recipients, sender, subject or body.
    pub fn validate(&self) -> Result<(), EmailError> {
        if self.to.is_empty() {
            return Err(EmailError::NoRecipients);
        }
        if self.from.is_none() {
            return Err(EmailError::NoSender);
        }
        if self.subject.is_none() {
            return Err(EmailError::NoSubject);
        }
        if self.html.is_none() {
            return Err(EmailError::NoContent);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> Email {
        Email::new()
            .to("ada@example.com")
            .from("noreply@example.com")
            .subject("Test")
            .html("<p>Hello</p>")
    }

    #[test]
    fn test_complete_email_validates() {
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn test_validation_reports_missing_parts() {
        let mut email = complete();
        email.to.clear();
        assert!(matches!(email.validate(), Err(EmailError::NoRecipients)));

        let email = Email { from: None, ..complete() };
        assert!(matches!(email.validate(), Err(EmailError::NoSender)));

        let email = Email { subject: None, ..complete() };
        assert!(matches!(email.validate(), Err(EmailError::NoSubject)));

        let email = Email { html: None, ..complete() };
        assert!(matches!(email.validate(), Err(EmailError::NoContent)));
    }

    #[test]
    fn test_from_compiled() {
        let compiled = CompiledEmail {
            recipient: "Ada <ada@example.com>".into(),
            subject: "Welcome".into(),
            html: "<p>Hi</p>".into(),
        };
        let email = Email::from_compiled(&compiled).from("noreply@example.com");
        assert_eq!(email.to, vec!["Ada <ada@example.com>"]);
        assert_eq!(email.subject.as_deref(), Some("Welcome"));
        assert_eq!(email.html.as_deref(), Some("<p>Hi</p>"));
        assert!(email.validate().is_ok());
    }
}

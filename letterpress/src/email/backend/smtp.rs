//! SMTP delivery through `lettre`

use async_trait::async_trait;
use lettre::{
    message::{header, Mailbox},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::debug;

use crate::config::SmtpSettings;
use crate::email::{Email, EmailError, EmailSender};

/// Relays emails through an SMTP server
///
/// The transport is built once from [`SmtpSettings`] and reused; `lettre`
/// pools connections internally.
pub struct SmtpBackend {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl std::fmt::Debug for SmtpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpBackend")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl SmtpBackend {
    /// Build a backend from config
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::Config`] if TLS parameters cannot be built for
    /// the host.
    pub fn new(settings: &SmtpSettings) -> Result<Self, EmailError> {
        let mut builder = if settings.use_tls {
            let tls = TlsParameters::new(settings.host.clone())
                .map_err(|e| EmailError::config(format!("TLS parameters error: {e}")))?;
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                .map_err(|e| EmailError::config(e.to_string()))?
                .tls(Tls::Required(tls))
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
        };

        if !settings.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.port(settings.port).build(),
            host: settings.host.clone(),
        })
    }

    fn build_message(email: &Email) -> Result<Message, EmailError> {
        email.validate()?;

        let mut builder = Message::builder()
            .from(parse_mailbox(email.from.as_deref().unwrap_or_default())?)
            .subject(email.subject.clone().unwrap_or_default());

        for address in &email.to {
            builder = builder.to(parse_mailbox(address)?);
        }

        let html = email.html.clone().ok_or(EmailError::NoContent)?;
        let message = builder.header(header::ContentType::TEXT_HTML).body(html);

        message.map_err(|e| EmailError::smtp(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, EmailError> {
    address
        .parse()
        .map_err(|_| EmailError::InvalidAddress(address.to_string()))
}

#[async_trait]
impl EmailSender for SmtpBackend {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        let message = Self::build_message(&email)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| EmailError::smtp(e.to_string()))?;
        debug!(host = %self.host, code = %response.code(), "SMTP relay accepted message");
        Ok(())
    }
}

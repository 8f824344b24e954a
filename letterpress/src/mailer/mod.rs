//! Compiling and delivering templates
//!
//! [`Mailer::send_template`] is what application code calls when an event
//! happens ("user signed up"). It loads the stored record, and only sends
//! if staff have enabled it. Test sends from the admin pass `force` to skip
//! that gate.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, instrument};

use crate::email::{Email, EmailError, EmailSender};
use crate::store::{StoreError, TemplateStore};
use crate::template::{CompileError, Compiler, Registry, RegistryError, TemplateInstance};

/// Errors raised while sending a template
#[derive(Debug, Error)]
pub enum MailerError {
    /// Unknown template or layout
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Record lookup failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Template did not compile
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Backend refused the message
    #[error(transparent)]
    Email(#[from] EmailError),
}

/// What happened to a send request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SendOutcome {
    /// Delivered to the backend
    Sent {
        /// Recipient mailbox
        recipient: String,
        /// Rendered subject
        subject: String,
    },
    /// Not sent because the template is missing from the store or disabled
    Skipped {
        /// Why
        reason: String,
    },
}

/// Sends compiled templates through an [`EmailSender`]
#[derive(Clone)]
pub struct Mailer {
    sender: Arc<dyn EmailSender>,
    store: Arc<dyn TemplateStore>,
    registry: Arc<Registry>,
    compiler: Arc<Compiler>,
    from: String,
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailer")
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl Mailer {
    /// Create a mailer sending from `from`
    #[must_use]
    pub fn new(
        sender: Arc<dyn EmailSender>,
        store: Arc<dyn TemplateStore>,
        registry: Arc<Registry>,
        compiler: Arc<Compiler>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            sender,
            store,
            registry,
            compiler,
            from: from.into(),
        }
    }

    /// From address used for every message
    #[must_use]
    pub fn from_address(&self) -> &str {
        &self.from
    }

    /// Compile and send `instance`
    ///
    /// Unless `force` is set, the instance's template must have an enabled
    /// record in the store; otherwise the send is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`MailerError`] if the store lookup, compilation or delivery
    /// fails.
    #[instrument(skip(self, instance), fields(template = instance.class.name()))]
    pub async fn send(
        &self,
        instance: &TemplateInstance,
        force: bool,
    ) -> Result<SendOutcome, MailerError> {
        if !force {
            let name = instance.class.name();
            match self.store.get(name).await? {
                Some(record) if record.enabled => {}
                Some(_) => return Ok(skipped(name, "template is disabled")),
                None => return Ok(skipped(name, "template has no stored record")),
            }
        }

        let compiled = self.compiler.compile(instance)?;
        let email = Email::from_compiled(&compiled).from(&self.from);
        self.sender.send(email).await?;

        info!(recipient = %compiled.recipient, force, "Template email sent");
        Ok(SendOutcome::Sent {
            recipient: compiled.recipient,
            subject: compiled.subject,
        })
    }

    /// Send the stored version of template `name` to `recipient`
    ///
    /// This is the production entry point: the record's subject, body and
    /// layout are used and disabled templates are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`MailerError::Registry`] if `name` is not registered or the
    /// record names an unknown layout, and the errors of [`Mailer::send`].
    pub async fn send_template(
        &self,
        name: &str,
        recipient: &str,
        kwargs: Map<String, Value>,
    ) -> Result<SendOutcome, MailerError> {
        let class = self.registry.get_template(name)?;
        let Some(record) = self.store.get(name).await? else {
            return Ok(skipped(name, "template has no stored record"));
        };
        if !record.enabled {
            return Ok(skipped(name, "template is disabled"));
        }

        let instance =
            TemplateInstance::from_record(&self.registry, class, &record, recipient)?.kwargs(kwargs);
        self.send(&instance, true).await
    }
}

fn skipped(name: &str, reason: &str) -> SendOutcome {
    info!(template = name, reason, "Template email skipped");
    SendOutcome::Skipped {
        reason: reason.to_string(),
    }
}

//! A template class bound to a recipient and concrete sources

use std::sync::Arc;

use serde_json::{Map, Value};

use super::{Layout, Registry, RegistryError, TemplateClass};
use crate::store::TemplateRecord;

/// Everything needed to compile one email
///
/// Built either from a stored record (production sends) or from editor
/// input (previews and test sends), where the layout and variables are
/// forced by the staff user.
#[derive(Clone)]
pub struct TemplateInstance {
    /// Template class providing schemas
    pub class: Arc<dyn TemplateClass>,
    /// Layout wrapped around the body
    pub layout: Arc<dyn Layout>,
    /// Recipient mailbox, `Name <addr>` or a bare address
    pub recipient: String,
    /// Constructor arguments, validated against the class schema on compile
    pub kwargs: Map<String, Value>,
    /// Values overriding computed variables
    pub force_variables: Map<String, Value>,
    /// Subject template source
    pub subject: String,
    /// Body template source
    pub body: String,
}

impl std::fmt::Debug for TemplateInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateInstance")
            .field("class", &self.class.name())
            .field("layout", &self.layout.name())
            .field("recipient", &self.recipient)
            .field("kwargs", &self.kwargs)
            .field("force_variables", &self.force_variables)
            .finish_non_exhaustive()
    }
}

impl TemplateInstance {
    /// Bind `class` to a recipient with empty sources
    #[must_use]
    pub fn new(
        class: Arc<dyn TemplateClass>,
        layout: Arc<dyn Layout>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            class,
            layout,
            recipient: recipient.into(),
            kwargs: Map::new(),
            force_variables: Map::new(),
            subject: String::new(),
            body: String::new(),
        }
    }

    /// Bind `class` using the sources and layout of its stored record
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::LayoutNotFound`] if the record names a layout
    /// that is no longer registered.
    pub fn from_record(
        registry: &Registry,
        class: Arc<dyn TemplateClass>,
        record: &TemplateRecord,
        recipient: impl Into<String>,
    ) -> Result<Self, RegistryError> {
        let layout = registry.resolve_layout(&record.layout)?;
        Ok(Self::new(class, layout, recipient)
            .subject(&record.subject)
            .body(&record.body))
    }

    /// Set constructor arguments
    #[must_use]
    pub fn kwargs(mut self, kwargs: Map<String, Value>) -> Self {
        self.kwargs = kwargs;
        self
    }

    /// Set forced variables
    #[must_use]
    pub fn force_variables(mut self, variables: Map<String, Value>) -> Self {
        self.force_variables = variables;
        self
    }

    /// Set the subject source
    #[must_use]
    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    /// Set the body source
    #[must_use]
    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }
}

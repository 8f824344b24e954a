//! Compilation of a template instance into subject and HTML
//!
//! Sources are rendered with minijinja in strict mode: referencing an
//! undeclared variable is a compile error rather than an empty string.
//! The body is HTML-escaped, the subject is plain text, and the layout
//! receives the compiled body as safe markup.

use std::collections::BTreeMap;

use minijinja::{AutoEscape, Environment, UndefinedBehavior, Value as TemplateValue};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use super::TemplateInstance;
use crate::schema::SchemaError;

const SUBJECT_NAME: &str = "subject.txt";
const BODY_NAME: &str = "body.html";

/// Errors raised while compiling a template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Constructor arguments do not satisfy the class schema
    #[error("invalid template arguments: {0}")]
    InvalidKwargs(SchemaError),

    /// A variable value does not satisfy its schema
    #[error("invalid value for variable `{name}`: {error}")]
    InvalidVariable {
        /// Variable name
        name: String,
        /// Validation failure
        error: SchemaError,
    },

    /// A declared variable has no value and no default
    #[error("variable `{0}` is required")]
    MissingVariable(String),

    /// Template syntax or evaluation failure
    #[error("error in {template}: {message}")]
    Render {
        /// Which source failed: subject, body or layout
        template: String,
        /// Line within that source
        line: Option<usize>,
        /// Engine message
        message: String,
    },
}

impl CompileError {
    fn render(template: &str, err: &minijinja::Error) -> Self {
        Self::Render {
            template: template.to_string(),
            line: err.line(),
            message: err.detail().map_or_else(|| err.kind().to_string(), |detail| {
                format!("{}: {detail}", err.kind())
            }),
        }
    }
}

/// Result of compiling a [`TemplateInstance`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledEmail {
    /// Recipient mailbox
    pub recipient: String,
    /// Single-line subject
    pub subject: String,
    /// Body wrapped in its layout
    pub html: String,
}

/// Renders template instances
pub struct Compiler {
    env: Environment<'static>,
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler").finish_non_exhaustive()
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// Create a compiler with strict undefined handling
    #[must_use]
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|name| {
            if name.ends_with(".html") {
                AutoEscape::Html
            } else {
                AutoEscape::None
            }
        });
        Self { env }
    }

    /// Compile `instance` into its final subject and HTML
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] if arguments or variables fail validation or
    /// any source fails to parse or render.
    pub fn compile(&self, instance: &TemplateInstance) -> Result<CompiledEmail, CompileError> {
        let context = Self::resolve_variables(instance)?;

        let subject = self
            .env
            .render_named_str(SUBJECT_NAME, &instance.subject, &context)
            .map_err(|e| CompileError::render("subject", &e))?;
        let subject = subject.split_whitespace().collect::<Vec<_>>().join(" ");

        let body = self
            .env
            .render_named_str(BODY_NAME, &instance.body, &context)
            .map_err(|e| CompileError::render("body", &e))?;

        let mut layout_context = context;
        layout_context.insert("body".to_string(), TemplateValue::from_safe_string(body));
        layout_context.insert("subject".to_string(), TemplateValue::from(subject.clone()));

        let layout_name = format!("layouts/{}.html", instance.layout.name());
        let html = self
            .env
            .render_named_str(&layout_name, instance.layout.source(), &layout_context)
            .map_err(|e| CompileError::render("layout", &e))?;

        debug!(
            template = instance.class.name(),
            layout = instance.layout.name(),
            html_len = html.len(),
            "Template compiled"
        );

        Ok(CompiledEmail {
            recipient: instance.recipient.clone(),
            subject,
            html,
        })
    }

    fn resolve_variables(
        instance: &TemplateInstance,
    ) -> Result<BTreeMap<String, TemplateValue>, CompileError> {
        let class = &instance.class;

        let kwargs = match class
            .kwargs()
            .validate(&Value::Object(instance.kwargs.clone()))
            .map_err(CompileError::InvalidKwargs)?
        {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let mut variables = class.get_variables(&kwargs);
        for (name, value) in &instance.force_variables {
            if class.variables().iter().any(|v| &v.name == name) {
                variables.insert(name.clone(), value.clone());
            } else {
                debug!(
                    template = class.name(),
                    variable = %name,
                    "Ignoring forced value for undeclared variable"
                );
            }
        }

        let mut context = BTreeMap::new();
        for variable in class.variables() {
            let raw = variables
                .get(&variable.name)
                .or(variable.default.as_ref())
                .ok_or_else(|| CompileError::MissingVariable(variable.name.clone()))?;

            let value = variable.schema.validate(raw).map_err(|error| {
                warn!(
                    template = class.name(),
                    variable = %variable.name,
                    error = %error,
                    "Variable failed validation"
                );
                CompileError::InvalidVariable {
                    name: variable.name.clone(),
                    error,
                }
            })?;

            context.insert(variable.name.clone(), TemplateValue::from_serialize(&value));
        }
        Ok(context)
    }
}

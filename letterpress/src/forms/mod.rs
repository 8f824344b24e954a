//! Admin form payloads
//!
//! Both editor forms arrive URL-encoded. [`ValidForm`] rejects invalid
//! input with 400; the change view instead reports field errors in its
//! JSON body, so it validates by hand.

use std::collections::BTreeMap;

use axum::extract::{Form, FromRequest, Request};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::error::AdminError;
use crate::store::TemplateChanges;

/// Validation messages keyed by field name
///
/// Serializes as `{"field": ["message", ...]}`.
///
/// ```rust
/// use letterpress::forms::FormErrors;
///
/// let mut errors = FormErrors::new();
/// errors.add("layout", "Unknown layout `fancy`");
/// assert!(errors.has_errors());
/// assert_eq!(errors.for_field("layout"), ["Unknown layout `fancy`"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    /// Empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message for `field`
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Whether any field has an error
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.0.is_empty()
    }

    /// Messages for `field`
    #[must_use]
    pub fn for_field(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }
}

impl From<validator::ValidationErrors> for FormErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = Self::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

/// Form extractor that validates after parsing
///
/// Parse and validation failures are both rejected with 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidForm<T>(pub T);

impl<T, S> FromRequest<S> for ValidForm<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync + 'static,
{
    type Rejection = AdminError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(data) = Form::<T>::from_request(req, state)
            .await
            .map_err(|err| AdminError::BadRequest(format!("Invalid form data: {err}")))?;
        data.validate()
            .map_err(|errors| AdminError::InvalidForm(errors.into()))?;
        Ok(Self(data))
    }
}

/// Editor state posted by preview and send-test
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct FakedataForm {
    /// Template class name
    #[validate(length(min = 1, message = "This field is required."))]
    pub template: String,

    /// Layout class name
    #[validate(length(min = 1, message = "This field is required."))]
    pub layout: String,

    /// Body source being edited
    #[serde(default)]
    pub body: String,

    /// Subject source being edited
    #[serde(default)]
    pub subject: String,

    /// JSON object of variable values
    #[serde(default)]
    pub variables: String,
}

impl FakedataForm {
    /// Decode `variables`; blank means no overrides
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::BadRequest`] unless `variables` is blank or a
    /// JSON object.
    pub fn parse_variables(&self) -> Result<Map<String, Value>, AdminError> {
        if self.variables.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&self.variables) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(AdminError::BadRequest(
                "variables must be a JSON object".to_string(),
            )),
            Err(e) => Err(AdminError::BadRequest(format!("variables are not valid JSON: {e}"))),
        }
    }
}

/// Stored fields posted by the change view
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct TemplateForm {
    /// Layout name
    #[validate(length(min = 1, message = "This field is required."))]
    pub layout: String,

    /// Subject source
    #[validate(length(min = 1, max = 255, message = "Enter a subject of at most 255 characters."))]
    pub subject: String,

    /// Body source
    pub body: String,

    /// Checkbox: present when ticked
    #[serde(deserialize_with = "checkbox")]
    pub enabled: bool,
}

impl TemplateForm {
    /// Fields to apply onto the stored record
    #[must_use]
    pub fn into_changes(self) -> TemplateChanges {
        TemplateChanges {
            layout: self.layout,
            subject: self.subject,
            body: self.body,
            enabled: self.enabled,
        }
    }
}

fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.is_some_and(|v| {
        matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "on" | "true" | "1" | "yes"
        )
    }))
}

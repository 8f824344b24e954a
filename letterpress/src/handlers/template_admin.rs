//! Template editor endpoints
//!
//! The change page is a shell that boots a client-side editor from an
//! embedded JSON config. The editor then calls `preview/` on every edit,
//! `send_test/` on demand, and posts the change form to save.
//!
//! ```bash
//! curl -X POST /admin/letterpress/templates/preview/ \
//!   -H 'x-staff-email: ada@example.com' \
//!   -d 'template=welcome&layout=default&subject=Hi&body=<p>Hi {{ name }}</p>&variables={"name":"Ada"}'
//! ```
//!
//! ```json
//! { "html": "<!DOCTYPE html>..." }
//! ```

use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{rejection::FormRejection, rejection::JsonRejection, Path, State},
    response::Html,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use validator::Validate;

use super::AdminUrls;
use crate::auth::StaffUser;
use crate::error::AdminError;
use crate::fake;
use crate::forms::{FakedataForm, FormErrors, TemplateForm, ValidForm};
use crate::state::LetterpressState;
use crate::store::transfer::{self, ExportDocument, ImportReport};
use crate::store::TemplateRecord;
use crate::template::{TemplateClass, TemplateInstance};

/// Recipient placeholder for previews, which are never sent
const PREVIEW_RECIPIENT: &str = "spam";

/// One row of the template list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSummary {
    /// Template class name
    pub name: String,
    /// Class description
    pub description: Option<String>,
    /// Whether production sends go out
    pub enabled: bool,
    /// Stored layout
    pub layout: String,
    /// Save counter
    pub version: u32,
    /// Editor URL
    pub change_url: String,
}

/// Template list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangelistResponse {
    /// Registered templates that have a stored record
    pub templates: Vec<TemplateSummary>,
}

/// Preview response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResponse {
    /// Body wrapped in the chosen layout
    pub html: String,
}

/// Test send response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendTestResponse {
    /// Mailbox the test went to
    pub mail: String,
}

/// List registered templates with their stored state
///
/// # Errors
///
/// Returns [`AdminError::Store`] if records cannot be listed.
pub async fn changelist(
    State(state): State<LetterpressState>,
    _staff: StaffUser,
) -> Result<Json<ChangelistResponse>, AdminError> {
    let urls = AdminUrls::new(&state.config().admin.prefix);
    let records = state.store().list().await?;

    let templates = state
        .registry()
        .templates()
        .iter()
        .filter_map(|class| {
            let record = records.iter().find(|r| r.name == class.name())?;
            Some(TemplateSummary {
                name: record.name.clone(),
                description: class.description().map(str::to_string),
                enabled: record.enabled,
                layout: record.layout.clone(),
                version: record.version,
                change_url: urls.change(&record.name),
            })
        })
        .collect();

    Ok(Json(ChangelistResponse { templates }))
}

/// Render the posted editor state with fake arguments
///
/// # Errors
///
/// - 400 if the form is invalid, `variables` is not a JSON object, or the
///   template does not compile
/// - 404 if the template or layout is unknown
#[allow(clippy::unused_async)]
pub async fn preview(
    State(state): State<LetterpressState>,
    _staff: StaffUser,
    ValidForm(form): ValidForm<FakedataForm>,
) -> Result<Json<PreviewResponse>, AdminError> {
    let instance = editor_instance(&state, &form, PREVIEW_RECIPIENT)?;
    let compiled = state.compiler().compile(&instance)?;
    Ok(Json(PreviewResponse { html: compiled.html }))
}

/// Send the posted editor state to the requesting staff member
///
/// The subject is prefixed with `Test: ` and the enabled flag is ignored.
///
/// # Errors
///
/// Same as [`preview`], plus 500 if delivery fails.
pub async fn send_test(
    State(state): State<LetterpressState>,
    staff: StaffUser,
    ValidForm(form): ValidForm<FakedataForm>,
) -> Result<Json<SendTestResponse>, AdminError> {
    let recipient = staff.mailbox();
    let instance = editor_instance(&state, &form, &recipient)?;
    let instance = instance.subject(&format!("Test: {}", form.subject));

    state.mailer().send(&instance, true).await?;
    info!(template = %form.template, staff = %staff.email, "Test email sent");

    Ok(Json(SendTestResponse { mail: recipient }))
}

fn editor_instance(
    state: &LetterpressState,
    form: &FakedataForm,
    recipient: &str,
) -> Result<TemplateInstance, AdminError> {
    let variables = form.parse_variables()?;
    let class = state.registry().get_template(&form.template)?;
    let layout = state.registry().get_layout(&form.layout)?;
    let kwargs = fake::fake_kwargs(class.as_ref());

    Ok(TemplateInstance::new(class, layout, recipient)
        .kwargs(kwargs)
        .force_variables(variables)
        .subject(&form.subject)
        .body(&form.body))
}

#[derive(Template)]
#[template(
    ext = "html",
    source = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Change email template {{ name }}</title>
<link rel="stylesheet" href="{{ static_url|safe }}editor.css">
</head>
<body>
<div id="letterpress-editor"></div>
<script>window.LETTERPRESS_CONFIG = {{ config|safe }};</script>
<script src="{{ static_url|safe }}editor.js"></script>
</body>
</html>"#
)]
struct ChangePage<'a> {
    name: &'a str,
    static_url: &'a str,
    config: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EditorConfig {
    static_url: String,
    template: EditorTemplate,
    changelist_url: String,
    change_url: String,
    preview_url: String,
    sendtest_url: String,
    layouts: Vec<EditorLayout>,
    variables: Vec<EditorVariable>,
}

#[derive(Debug, Serialize)]
struct EditorTemplate {
    template: String,
    body: String,
    layout: String,
    enabled: bool,
    subject: String,
}

#[derive(Debug, Serialize)]
struct EditorLayout {
    value: String,
    label: String,
}

#[derive(Debug, Serialize)]
struct EditorVariable {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    value: Value,
}

fn editor_config(
    state: &LetterpressState,
    class: &Arc<dyn TemplateClass>,
    record: &TemplateRecord,
) -> EditorConfig {
    let urls = AdminUrls::new(&state.config().admin.prefix);
    let registry = state.registry();
    let fake_values = fake::fake_variables(class.as_ref());

    let layout = if record.layout.is_empty() {
        registry.default_layout().name().to_string()
    } else {
        record.layout.clone()
    };

    EditorConfig {
        static_url: format!("{}letterpress/", state.config().admin.static_url),
        template: EditorTemplate {
            template: record.name.clone(),
            body: record.body.clone(),
            layout,
            enabled: record.enabled,
            subject: record.subject.clone(),
        },
        changelist_url: urls.changelist(),
        change_url: urls.change(&record.name),
        preview_url: urls.preview(),
        sendtest_url: urls.send_test(),
        layouts: registry
            .layouts()
            .iter()
            .map(|layout| EditorLayout {
                value: layout.name().to_string(),
                label: layout.label().to_string(),
            })
            .collect(),
        variables: class
            .variables()
            .iter()
            .map(|variable| EditorVariable {
                name: variable.name.clone(),
                kind: variable.schema.to_string(),
                value: fake_values
                    .get(&variable.name)
                    .cloned()
                    .unwrap_or_else(|| fake::generate(&variable.schema)),
            })
            .collect(),
    }
}

/// JSON for embedding inside a `<script>` element
fn script_json<T: Serialize>(value: &T) -> Result<String, AdminError> {
    let json = serde_json::to_string(value).map_err(|e| AdminError::Internal(e.to_string()))?;
    Ok(json.replace('<', "\\u003C"))
}

async fn load(
    state: &LetterpressState,
    name: &str,
) -> Result<(Arc<dyn TemplateClass>, TemplateRecord), AdminError> {
    let class = state.registry().get_template(name)?;
    let record = state
        .store()
        .get(name)
        .await?
        .ok_or_else(|| AdminError::NotFound(format!("no stored record for template `{name}`")))?;
    Ok((class, record))
}

/// Editor page for template `name`
///
/// # Errors
///
/// Returns 404 if the template is not registered or has no record.
pub async fn change_form(
    State(state): State<LetterpressState>,
    _staff: StaffUser,
    Path(name): Path<String>,
) -> Result<Html<String>, AdminError> {
    let (class, record) = load(&state, &name).await?;
    let config = script_json(&editor_config(&state, &class, &record))?;
    let static_url = format!("{}letterpress/", state.config().admin.static_url);

    let page = ChangePage {
        name: &name,
        static_url: &static_url,
        config: &config,
    }
    .render()
    .map_err(|e| AdminError::Internal(e.to_string()))?;
    Ok(Html(page))
}

/// Save the change form
///
/// Field errors are reported in the body as
/// `{"status": "error", "errors": {...}}` rather than as a failure status.
///
/// # Errors
///
/// Returns 404 for unknown templates and 400 if the body cannot be parsed
/// as a form.
pub async fn change_save(
    State(state): State<LetterpressState>,
    _staff: StaffUser,
    Path(name): Path<String>,
    form: Result<Form<TemplateForm>, FormRejection>,
) -> Result<Json<Value>, AdminError> {
    let Form(form) = form.map_err(|e| AdminError::BadRequest(e.body_text()))?;
    let (_, record) = load(&state, &name).await?;

    let mut errors = form.validate().map_or_else(FormErrors::from, |()| FormErrors::new());
    if !form.layout.is_empty() && state.registry().get_layout(&form.layout).is_err() {
        errors.add(
            "layout",
            format!(
                "Select a valid choice. {} is not one of the available choices.",
                form.layout
            ),
        );
    }
    if errors.has_errors() {
        return Ok(Json(json!({ "status": "error", "errors": errors })));
    }

    let saved = state.store().save(form.into_changes().apply(record)).await?;
    info!(template = %saved.name, version = saved.version, "Template saved");
    Ok(Json(json!({ "status": "ok", "version": saved.version })))
}

/// Every stored record as an export document
///
/// # Errors
///
/// Returns [`AdminError::Store`] if records cannot be listed.
pub async fn export(
    State(state): State<LetterpressState>,
    _staff: StaffUser,
) -> Result<Json<ExportDocument>, AdminError> {
    Ok(Json(transfer::export(state.store().as_ref()).await?))
}

/// Apply an export document
///
/// # Errors
///
/// Returns 400 if the body is not an export document.
pub async fn import(
    State(state): State<LetterpressState>,
    _staff: StaffUser,
    document: Result<Json<ExportDocument>, JsonRejection>,
) -> Result<Json<ImportReport>, AdminError> {
    let Json(document) = document.map_err(|e| AdminError::BadRequest(e.body_text()))?;
    let report = transfer::import(state.store().as_ref(), state.registry(), document).await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_json_escapes_tags() {
        let json = script_json(&json!({ "body": "</script><b>" })).unwrap();
        assert_eq!(json, r#"{"body":"\u003C/script>\u003Cb>"}"#);
    }

    #[test]
    fn test_change_page_embeds_config_verbatim() {
        let page = ChangePage {
            name: "welcome",
            static_url: "/static/letterpress/",
            config: r#"{"a":"b"}"#,
        }
        .render()
        .unwrap();
        assert!(page.contains(r#"window.LETTERPRESS_CONFIG = {"a":"b"};"#));
        assert!(page.contains("/static/letterpress/editor.js"));
    }
}

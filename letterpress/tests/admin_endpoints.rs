//! Integration tests for the template admin API
//!
//! Drives the full router over an in-memory store with the stock templates.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use letterpress::handlers::router;
use letterpress::testing::{test_state, RecordingSender};
use serde_json::{json, Value};

const PREFIX: &str = "/admin/letterpress/templates";

async fn server() -> (TestServer, RecordingSender, letterpress::state::LetterpressState) {
    let (state, sender) = test_state().await;
    let server = TestServer::new(router(state.clone())).unwrap();
    (server, sender, state)
}

fn as_staff(request: TestRequest) -> TestRequest {
    request
        .add_header(
            HeaderName::from_static("x-staff-email"),
            HeaderValue::from_static("ada@example.com"),
        )
        .add_header(
            HeaderName::from_static("x-staff-name"),
            HeaderValue::from_static("Ada Lovelace"),
        )
}

fn editor_form<'a>(template: &'a str, body: &'a str, variables: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("template", template),
        ("layout", "plain"),
        ("subject", "Hi {{ name }}"),
        ("body", body),
        ("variables", variables),
    ]
}

#[tokio::test]
async fn test_health_needs_no_identity() {
    let (server, _, _) = server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_requests_without_staff_identity_are_rejected() {
    let (server, _, _) = server().await;
    let response = server
        .post(&format!("{PREFIX}/preview/"))
        .form(&editor_form("welcome", "<p>{{ name }}</p>", ""))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_changelist() {
    let (server, _, _) = server().await;
    let response = as_staff(server.get(&format!("{PREFIX}/"))).await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    let templates = body["templates"].as_array().unwrap();
    assert_eq!(templates.len(), 3);
    assert_eq!(templates[0]["name"], "welcome");
    assert_eq!(templates[0]["enabled"], false);
    assert_eq!(templates[0]["version"], 0);
    assert_eq!(templates[0]["change_url"], format!("{PREFIX}/welcome/change/"));
}

#[tokio::test]
async fn test_preview_renders_body_in_layout() {
    let (server, _, _) = server().await;
    let response = as_staff(server.post(&format!("{PREFIX}/preview/")))
        .form(&editor_form("welcome", "<p>Hello {{ name }}</p>", r#"{"name": "Ada"}"#))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({ "html": "<html><body><p>Hello Ada</p></body></html>" })
    );
}

#[tokio::test]
async fn test_preview_without_variables_uses_fake_data() {
    let (server, _, _) = server().await;
    let response = as_staff(server.post(&format!("{PREFIX}/preview/")))
        .form(&[
            ("template", "password_reset"),
            ("layout", "plain"),
            ("subject", "Reset your password"),
            ("body", "<a href=\"{{ reset_url }}\">reset</a>"),
        ])
        .await;
    response.assert_status_ok();
    let html = response.json::<Value>()["html"].as_str().unwrap().to_string();
    assert!(html.contains("https:&#x2f;&#x2f;example.com&#x2f;reset&#x2f;"));
}

#[tokio::test]
async fn test_preview_rejects_invalid_variables() {
    let (server, _, _) = server().await;

    let response = as_staff(server.post(&format!("{PREFIX}/preview/")))
        .form(&editor_form("welcome", "<p>{{ name }}</p>", "{not json"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = as_staff(server.post(&format!("{PREFIX}/preview/")))
        .form(&editor_form("welcome", "<p>{{ name }}</p>", "[1, 2, 3]"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_preview_rejects_missing_fields() {
    let (server, _, _) = server().await;
    let response = as_staff(server.post(&format!("{PREFIX}/preview/")))
        .form(&[("template", "welcome"), ("layout", "")])
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["errors"]["layout"].is_array());
}

#[tokio::test]
async fn test_preview_unknown_template_or_layout() {
    let (server, _, _) = server().await;

    let response = as_staff(server.post(&format!("{PREFIX}/preview/")))
        .form(&editor_form("farewell", "<p>bye</p>", ""))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = as_staff(server.post(&format!("{PREFIX}/preview/")))
        .form(&[
            ("template", "welcome"),
            ("layout", "neon"),
            ("subject", "Hi"),
            ("body", "<p>Hi</p>"),
        ])
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_preview_compile_errors_are_bad_requests() {
    let (server, _, _) = server().await;

    let response = as_staff(server.post(&format!("{PREFIX}/preview/")))
        .form(&editor_form("welcome", "{% if name %}unterminated", ""))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = as_staff(server.post(&format!("{PREFIX}/preview/")))
        .form(&editor_form("welcome", "<p>{{ not_declared }}</p>", ""))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = as_staff(server.post(&format!("{PREFIX}/preview/")))
        .form(&editor_form("welcome", "<p>{{ activation_url }}</p>", r#"{"activation_url": "nope"}"#))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_send_test_goes_to_staff_member() {
    let (server, sender, _) = server().await;
    let response = as_staff(server.post(&format!("{PREFIX}/send_test/")))
        .form(&editor_form("welcome", "<p>Hello {{ name }}</p>", r#"{"name": "Ada"}"#))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({ "mail": "Ada Lovelace <ada@example.com>" })
    );

    let email = sender.last_sent().unwrap();
    assert_eq!(email.to, vec!["Ada Lovelace <ada@example.com>".to_string()]);
    assert_eq!(email.subject.as_deref(), Some("Test: Hi Ada"));
    assert_eq!(
        email.html.as_deref(),
        Some("<html><body><p>Hello Ada</p></body></html>")
    );
}

#[tokio::test]
async fn test_send_test_ignores_disabled_flag() {
    let (server, sender, state) = server().await;
    let record = state.store().get("welcome").await.unwrap().unwrap();
    assert!(!record.enabled);

    as_staff(server.post(&format!("{PREFIX}/send_test/")))
        .form(&editor_form("welcome", "<p>Hi</p>", ""))
        .await
        .assert_status_ok();
    assert_eq!(sender.sent_count(), 1);
}

#[tokio::test]
async fn test_change_form_embeds_editor_config() {
    let (server, _, _) = server().await;
    let response = as_staff(server.get(&format!("{PREFIX}/welcome/change/"))).await;
    response.assert_status_ok();

    let page = response.text();
    assert!(page.contains("window.LETTERPRESS_CONFIG = {"));
    assert!(page.contains(&format!(r#""previewUrl":"{PREFIX}/preview/""#)));
    assert!(page.contains(&format!(r#""sendtestUrl":"{PREFIX}/send_test/""#)));
    assert!(page.contains(r#""staticUrl":"/static/letterpress/""#));
    assert!(page.contains(r#"{"value":"default","label":"Branded card"}"#));
    assert!(page.contains(r#""type":"<URL>""#.replace('<', "\\u003C").as_str()));
    assert!(page.contains("\\u003Ch1>"));
    assert!(!page.contains("<h1>"));
}

#[tokio::test]
async fn test_change_form_unknown_template() {
    let (server, _, _) = server().await;
    as_staff(server.get(&format!("{PREFIX}/farewell/change/")))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_change_save_bumps_version_only_on_change() {
    let (server, _, state) = server().await;
    let form = [
        ("layout", "plain"),
        ("subject", "Welcome, {{ name }}"),
        ("body", "<p>Hello {{ name }}</p>"),
        ("enabled", "on"),
    ];

    let response = as_staff(server.post(&format!("{PREFIX}/welcome/change/")))
        .form(&form)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "status": "ok", "version": 1 }));

    let response = as_staff(server.post(&format!("{PREFIX}/welcome/change/")))
        .form(&form)
        .await;
    assert_eq!(response.json::<Value>(), json!({ "status": "ok", "version": 1 }));

    let record = state.store().get("welcome").await.unwrap().unwrap();
    assert!(record.enabled);
    assert_eq!(record.layout, "plain");
    assert_eq!(record.subject, "Welcome, {{ name }}");
}

#[tokio::test]
async fn test_change_save_reports_field_errors() {
    let (server, _, state) = server().await;
    let response = as_staff(server.post(&format!("{PREFIX}/welcome/change/")))
        .form(&[("layout", "neon"), ("subject", ""), ("body", "x")])
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["status"], "error");
    assert!(body["errors"]["layout"].is_array());
    assert!(body["errors"]["subject"].is_array());

    let record = state.store().get("welcome").await.unwrap().unwrap();
    assert_eq!(record.version, 0);
}

#[tokio::test]
async fn test_export_then_import() {
    let (server, _, state) = server().await;

    let response = as_staff(server.get(&format!("{PREFIX}/export/"))).await;
    response.assert_status_ok();
    let mut document = response.json::<Value>();
    assert_eq!(document["templates"].as_array().unwrap().len(), 3);

    document["templates"][0]["subject"] = json!("Imported subject");
    document["templates"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "name": "farewell", "subject": "Bye" }));

    let response = as_staff(server.post(&format!("{PREFIX}/import/")))
        .json(&document)
        .await;
    response.assert_status_ok();
    let report = response.json::<Value>();
    assert_eq!(report["imported"].as_array().unwrap().len(), 3);
    assert_eq!(report["skipped"], json!(["farewell"]));

    let name = document["templates"][0]["name"].as_str().unwrap();
    let record = state.store().get(name).await.unwrap().unwrap();
    assert_eq!(record.subject, "Imported subject");
    assert_eq!(record.version, 1);
}

#[tokio::test]
async fn test_import_rejects_malformed_document() {
    let (server, _, _) = server().await;
    as_staff(server.post(&format!("{PREFIX}/import/")))
        .json(&json!({ "templates": "nope" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

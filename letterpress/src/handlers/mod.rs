//! HTTP routes
//!
//! All admin routes sit under the configured prefix (by default
//! `/admin/letterpress/templates`) and require a [`StaffUser`](crate::auth::StaffUser).
//! `/health` is mounted at the root without authentication.

pub mod template_admin;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::state::LetterpressState;

/// Admin URLs derived from the configured prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUrls {
    prefix: String,
}

impl AdminUrls {
    /// URLs under `prefix`
    ///
    /// The prefix always starts with `/` and never ends with one, so
    /// `admin/mail/` and `/admin/mail` mount at the same place.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        let trimmed = prefix.trim().trim_matches('/');
        let prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };
        Self { prefix }
    }

    /// Template list
    #[must_use]
    pub fn changelist(&self) -> String {
        format!("{}/", self.prefix)
    }

    /// Editor for template `name`
    #[must_use]
    pub fn change(&self, name: &str) -> String {
        format!("{}/{name}/change/", self.prefix)
    }

    /// Preview endpoint
    #[must_use]
    pub fn preview(&self) -> String {
        format!("{}/preview/", self.prefix)
    }

    /// Test send endpoint
    #[must_use]
    pub fn send_test(&self) -> String {
        format!("{}/send_test/", self.prefix)
    }

    /// Export endpoint
    #[must_use]
    pub fn export(&self) -> String {
        format!("{}/export/", self.prefix)
    }

    /// Import endpoint
    #[must_use]
    pub fn import(&self) -> String {
        format!("{}/import/", self.prefix)
    }
}

/// Build the application router
///
/// # Example
///
/// ```rust,no_run
/// # async fn example() -> anyhow::Result<()> {
/// let (state, _) = letterpress::testing::test_state().await;
/// let app = letterpress::handlers::router(state);
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
#[must_use]
#[allow(clippy::literal_string_with_formatting_args)]
pub fn router(state: LetterpressState) -> Router {
    let urls = AdminUrls::new(&state.config().admin.prefix);

    Router::new()
        .route("/health", get(health))
        .route(&urls.changelist(), get(template_admin::changelist))
        .route(&urls.preview(), post(template_admin::preview))
        .route(&urls.send_test(), post(template_admin::send_test))
        .route(&urls.export(), get(template_admin::export))
        .route(&urls.import(), post(template_admin::import))
        .route(
            &urls.change("{name}"),
            get(template_admin::change_form).post(template_admin::change_save),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

//! letterpress: staff-editable email templates
//!
//! Developers declare email templates in code: which arguments each one
//! takes and which variables its body may use. Staff edit the subject,
//! body and layout of those templates through an admin API, preview them
//! against generated sample data, send themselves test copies, and enable
//! a template once it is ready. Application code then sends through
//! [`Mailer::send_template`](mailer::Mailer::send_template), which skips
//! templates that are still disabled.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use letterpress::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     observability::init()?;
//!
//!     let config = LetterpressConfig::load()?;
//!     let registry = builtin::registry_builder().build()?;
//!     let state = LetterpressState::from_config(config.clone(), registry).await?;
//!
//!     let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;
//!     axum::serve(listener, router(state)).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`schema`]: value schemas that validate and convert template data
//! - [`fake`]: sample data generated from schemas
//! - [`template`]: template classes, layouts, registry and compiler
//! - [`store`]: persisted template records, export and import
//! - [`email`], [`mailer`]: delivery
//! - [`handlers`]: the admin HTTP API

#![allow(clippy::missing_errors_doc)]

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod fake;
pub mod forms;
pub mod handlers;
pub mod mailer;
pub mod observability;
pub mod schema;
pub mod state;
pub mod store;
pub mod template;
pub mod testing;

pub mod prelude {
    //! Common imports
    //!
    //! ```rust
    //! use letterpress::prelude::*;
    //! ```

    pub use crate::auth::StaffUser;
    pub use crate::config::LetterpressConfig;
    pub use crate::email::{Email, EmailError, EmailSender};
    pub use crate::error::AdminError;
    pub use crate::handlers::router;
    pub use crate::mailer::{Mailer, MailerError, SendOutcome};
    pub use crate::observability;
    pub use crate::schema::{Key, Schema, SchemaError};
    pub use crate::state::LetterpressState;
    pub use crate::store::{MemoryStore, TemplateRecord, TemplateStore};
    pub use crate::template::{
        builtin, CompileError, CompiledEmail, Compiler, DeclaredTemplate, Layout, Registry,
        StaticLayout, TemplateClass, TemplateInstance, Variable,
    };
}

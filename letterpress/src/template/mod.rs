//! Template classes, layouts, registry and compiler
//!
//! A [`TemplateClass`] is defined in code and declares its arguments and
//! variables. Staff users edit the subject and body of the matching stored
//! record; a [`Layout`] wraps the body at render time. The [`Compiler`]
//! turns a [`TemplateInstance`] into a [`CompiledEmail`].
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use letterpress::schema::Schema;
//! use letterpress::template::{Compiler, DeclaredTemplate, StaticLayout, TemplateInstance, Variable};
//! use serde_json::json;
//!
//! let class = DeclaredTemplate::new("hello").variable(Variable::new("name", Schema::string()));
//! let layout = StaticLayout::new("plain", "<div>{{ body }}</div>");
//!
//! let mut vars = serde_json::Map::new();
//! vars.insert("name".into(), json!("Ada"));
//!
//! let instance = TemplateInstance::new(Arc::new(class), Arc::new(layout), "ada@example.com")
//!     .force_variables(vars)
//!     .subject("Hi {{ name }}")
//!     .body("<p>Hello {{ name }}</p>");
//!
//! let compiled = Compiler::new().compile(&instance).unwrap();
//! assert_eq!(compiled.html, "<div><p>Hello Ada</p></div>");
//! ```

pub mod builtin;
mod class;
mod compiler;
mod instance;
mod layout;
mod registry;

pub use class::{DeclaredTemplate, FakeFn, TemplateClass, Variable, VariablesFn};
pub use compiler::{CompileError, CompiledEmail, Compiler};
pub use instance::TemplateInstance;
pub use layout::{Layout, StaticLayout};
pub use registry::{Registry, RegistryBuilder, RegistryError};

//! Schema validation error

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// A value failed to satisfy its [`Schema`](super::Schema)
///
/// Carries the location of the offending value relative to the validated
/// root, e.g. `items[1].qty`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{message}", render_prefix(.path))]
pub struct SchemaError {
    path: Vec<Segment>,
    message: String,
}

impl SchemaError {
    /// Create an error at the root location
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            message: message.into(),
        }
    }

    /// Prefix the location with a dict key
    #[must_use]
    pub fn at_key(mut self, key: &str) -> Self {
        self.path.insert(0, Segment::Key(key.to_string()));
        self
    }

    /// Prefix the location with a list index
    #[must_use]
    pub fn at_index(mut self, index: usize) -> Self {
        self.path.insert(0, Segment::Index(index));
        self
    }

    /// Location of the offending value, empty for the root
    #[must_use]
    pub fn path(&self) -> String {
        render_path(&self.path)
    }

    /// Message without the location
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

fn render_path(path: &[Segment]) -> String {
    let mut rendered = String::new();
    for segment in path {
        match segment {
            Segment::Key(key) => {
                if !rendered.is_empty() {
                    rendered.push('.');
                }
                rendered.push_str(key);
            }
            Segment::Index(index) => {
                rendered.push('[');
                rendered.push_str(&index.to_string());
                rendered.push(']');
            }
        }
    }
    rendered
}

fn render_prefix(path: &[Segment]) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!("{}: ", render_path(path))
    }
}

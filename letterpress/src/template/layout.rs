//! Layouts wrap a compiled body with shared markup

/// A reusable wrapper applied around a template body
///
/// The source is a template that receives every template variable plus
/// `subject` and the already compiled `body` (marked safe).
pub trait Layout: Send + Sync {
    /// Unique identifier stored on template records
    fn name(&self) -> &str;

    /// Label shown in the layout picker
    fn description(&self) -> Option<&str> {
        None
    }

    /// Wrapper template source
    fn source(&self) -> &str;

    /// Label falling back to the name
    fn label(&self) -> &str {
        self.description().unwrap_or_else(|| self.name())
    }
}

/// A layout defined by a static source string
#[derive(Debug, Clone)]
pub struct StaticLayout {
    name: String,
    description: Option<String>,
    source: String,
}

impl StaticLayout {
    /// Create a layout
    #[must_use]
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            source: source.into(),
        }
    }

    /// Set the human description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Layout for StaticLayout {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn source(&self) -> &str {
        &self.source
    }
}

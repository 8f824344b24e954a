//! Lookup of template and layout classes by name

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use super::{Layout, TemplateClass};
use crate::store::{StoreError, TemplateRecord, TemplateStore};

/// Registry lookup and registration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No template class with this name
    #[error("template `{0}` is not registered")]
    TemplateNotFound(String),

    /// No layout with this name
    #[error("layout `{0}` is not registered")]
    LayoutNotFound(String),

    /// Two template classes share a name
    #[error("template `{0}` is registered twice")]
    DuplicateTemplate(String),

    /// Two layouts share a name
    #[error("layout `{0}` is registered twice")]
    DuplicateLayout(String),

    /// At least one layout is required
    #[error("at least one layout must be registered")]
    NoLayouts,
}

/// Immutable set of registered template classes and layouts
///
/// Layouts keep registration order; the first one is the default.
#[derive(Clone)]
pub struct Registry {
    templates: Vec<Arc<dyn TemplateClass>>,
    layouts: Vec<Arc<dyn Layout>>,
    default_layout: Arc<dyn Layout>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field(
                "templates",
                &self.templates.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .field(
                "layouts",
                &self.layouts.iter().map(|l| l.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

/// Builder for [`Registry`]
///
/// # Examples
///
/// ```rust
/// use letterpress::template::{DeclaredTemplate, Registry, StaticLayout};
///
/// let registry = Registry::builder()
///     .layout(StaticLayout::new("plain", "{{ body }}"))
///     .template(DeclaredTemplate::new("welcome"))
///     .build()
///     .unwrap();
///
/// assert!(registry.get_template("welcome").is_ok());
/// assert!(registry.get_template("missing").is_err());
/// ```
#[derive(Default)]
pub struct RegistryBuilder {
    templates: Vec<Arc<dyn TemplateClass>>,
    layouts: Vec<Arc<dyn Layout>>,
}

impl RegistryBuilder {
    /// Register a template class
    #[must_use]
    pub fn template(mut self, class: impl TemplateClass + 'static) -> Self {
        self.templates.push(Arc::new(class));
        self
    }

    /// Register a layout
    #[must_use]
    pub fn layout(mut self, layout: impl Layout + 'static) -> Self {
        self.layouts.push(Arc::new(layout));
        self
    }

    /// Finish registration
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] on duplicate names or when no layout was
    /// registered.
    pub fn build(self) -> Result<Registry, RegistryError> {
        for (index, class) in self.templates.iter().enumerate() {
            if self.templates[..index]
                .iter()
                .any(|other| other.name() == class.name())
            {
                return Err(RegistryError::DuplicateTemplate(class.name().to_string()));
            }
        }
        for (index, layout) in self.layouts.iter().enumerate() {
            if self.layouts[..index]
                .iter()
                .any(|other| other.name() == layout.name())
            {
                return Err(RegistryError::DuplicateLayout(layout.name().to_string()));
            }
        }
        let Some(default_layout) = self.layouts.first().cloned() else {
            return Err(RegistryError::NoLayouts);
        };

        debug!(
            templates = self.templates.len(),
            layouts = self.layouts.len(),
            "Template registry built"
        );

        Ok(Registry {
            templates: self.templates,
            layouts: self.layouts,
            default_layout,
        })
    }
}

impl Registry {
    /// Start building a registry
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Look up a template class
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::TemplateNotFound`] for unknown names.
    pub fn get_template(&self, name: &str) -> Result<Arc<dyn TemplateClass>, RegistryError> {
        self.templates
            .iter()
            .find(|class| class.name() == name)
            .cloned()
            .ok_or_else(|| RegistryError::TemplateNotFound(name.to_string()))
    }

    /// Look up a layout
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::LayoutNotFound`] for unknown names.
    pub fn get_layout(&self, name: &str) -> Result<Arc<dyn Layout>, RegistryError> {
        self.layouts
            .iter()
            .find(|layout| layout.name() == name)
            .cloned()
            .ok_or_else(|| RegistryError::LayoutNotFound(name.to_string()))
    }

    /// Resolve a stored layout identifier, empty meaning the default
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::LayoutNotFound`] for unknown non-empty names.
    pub fn resolve_layout(&self, name: &str) -> Result<Arc<dyn Layout>, RegistryError> {
        if name.is_empty() {
            Ok(self.default_layout())
        } else {
            self.get_layout(name)
        }
    }

    /// All template classes in registration order
    #[must_use]
    pub fn templates(&self) -> &[Arc<dyn TemplateClass>] {
        &self.templates
    }

    /// All layouts in registration order
    #[must_use]
    pub fn layouts(&self) -> &[Arc<dyn Layout>] {
        &self.layouts
    }

    /// First registered layout
    #[must_use]
    pub fn default_layout(&self) -> Arc<dyn Layout> {
        Arc::clone(&self.default_layout)
    }

    /// Create a record for every template class that has none
    ///
    /// New records start disabled, on the default layout, seeded with the
    /// class's default subject and body. Returns how many were created.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store fails.
    pub async fn sync(&self, store: &dyn TemplateStore) -> Result<usize, StoreError> {
        let default_layout = self.default_layout();
        let mut created = 0;
        for class in &self.templates {
            let record = TemplateRecord {
                name: class.name().to_string(),
                enabled: false,
                layout: default_layout.name().to_string(),
                subject: class.default_subject().to_string(),
                body: class.default_body().to_string(),
                version: 0,
            };
            if store.insert_if_missing(record).await? {
                info!(template = class.name(), "Created template record");
                created += 1;
            }
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::template::{DeclaredTemplate, StaticLayout};

    fn registry() -> Registry {
        Registry::builder()
            .layout(StaticLayout::new("first", "{{ body }}"))
            .layout(StaticLayout::new("second", "<div>{{ body }}</div>"))
            .template(DeclaredTemplate::new("welcome").seed("Hi", "Welcome!"))
            .template(DeclaredTemplate::new("goodbye"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_lookup() {
        let registry = registry();
        assert_eq!(registry.get_template("goodbye").unwrap().name(), "goodbye");
        assert_eq!(
            registry.get_template("nope").err(),
            Some(RegistryError::TemplateNotFound("nope".into()))
        );
        assert_eq!(registry.get_layout("second").unwrap().name(), "second");
        assert!(matches!(
            registry.get_layout("third"),
            Err(RegistryError::LayoutNotFound(_))
        ));
    }

    #[test]
    fn test_default_layout_is_first() {
        let registry = registry();
        assert_eq!(registry.default_layout().name(), "first");
        assert_eq!(registry.resolve_layout("").unwrap().name(), "first");
        assert_eq!(registry.resolve_layout("second").unwrap().name(), "second");
    }

    #[test]
    fn test_duplicates_rejected() {
        let err = Registry::builder()
            .layout(StaticLayout::new("a", ""))
            .template(DeclaredTemplate::new("x"))
            .template(DeclaredTemplate::new("x"))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateTemplate("x".into()));

        let err = Registry::builder()
            .layout(StaticLayout::new("a", ""))
            .layout(StaticLayout::new("a", ""))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateLayout("a".into()));
    }

    #[test]
    fn test_layout_required() {
        let err = Registry::builder().build().unwrap_err();
        assert_eq!(err, RegistryError::NoLayouts);
    }

    #[tokio::test]
    async fn test_sync_creates_missing_records_once() {
        let registry = registry();
        let store = MemoryStore::new();

        assert_eq!(registry.sync(&store).await.unwrap(), 2);
        assert_eq!(registry.sync(&store).await.unwrap(), 0);

        let welcome = store.get("welcome").await.unwrap().unwrap();
        assert!(!welcome.enabled);
        assert_eq!(welcome.layout, "first");
        assert_eq!(welcome.subject, "Hi");
        assert_eq!(welcome.body, "Welcome!");
        assert_eq!(welcome.version, 0);
    }
}

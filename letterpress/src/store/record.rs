//! Stored template record

use serde::{Deserialize, Serialize};

/// Editable configuration of one template class
///
/// `name` ties the record to the [`TemplateClass`](crate::template::TemplateClass)
/// it configures. `version` is bumped by the store whenever a save changes
/// the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRecord {
    /// Template class name
    pub name: String,

    /// Whether production sends are allowed
    #[serde(default)]
    pub enabled: bool,

    /// Layout identifier, empty meaning the default layout
    #[serde(default)]
    pub layout: String,

    /// Subject template source
    #[serde(default)]
    pub subject: String,

    /// Body template source
    #[serde(default)]
    pub body: String,

    /// Save counter
    #[serde(default)]
    pub version: u32,
}

impl TemplateRecord {
    /// A disabled record with empty sources
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: false,
            layout: String::new(),
            subject: String::new(),
            body: String::new(),
            version: 0,
        }
    }

    /// Whether the editable fields match, ignoring the version
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        self.enabled == other.enabled
            && self.layout == other.layout
            && self.subject == other.subject
            && self.body == other.body
    }
}

/// The fields a staff user may change on a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateChanges {
    /// New layout identifier
    pub layout: String,
    /// New subject source
    pub subject: String,
    /// New body source
    pub body: String,
    /// New enabled flag
    pub enabled: bool,
}

impl TemplateChanges {
    /// Apply onto `record`, keeping its name and version
    #[must_use]
    pub fn apply(self, record: TemplateRecord) -> TemplateRecord {
        TemplateRecord {
            layout: self.layout,
            subject: self.subject,
            body: self.body,
            enabled: self.enabled,
            ..record
        }
    }
}

//! Export and import of template records
//!
//! Lets staff move edited templates between environments. Import applies
//! the editable fields of each document entry onto the matching record;
//! versions in the document are ignored and bumped by the store instead.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{StoreError, TemplateChanges, TemplateRecord, TemplateStore};
use crate::template::Registry;

/// Serialized set of records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    /// Records ordered by name
    pub templates: Vec<TemplateRecord>,
}

/// Outcome of an import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Names of records written
    pub imported: Vec<String>,
    /// Names rejected because the template or layout is not registered
    pub skipped: Vec<String>,
}

/// Export every record in `store`
///
/// # Errors
///
/// Returns [`StoreError`] if the store fails.
pub async fn export(store: &dyn TemplateStore) -> Result<ExportDocument, StoreError> {
    Ok(ExportDocument {
        templates: store.list().await?,
    })
}

/// Import `document` into `store`
///
/// Entries naming an unregistered template class or layout are skipped.
///
/// # Errors
///
/// Returns [`StoreError`] if the store fails; entries saved before the
/// failure stay saved.
pub async fn import(
    store: &dyn TemplateStore,
    registry: &Registry,
    document: ExportDocument,
) -> Result<ImportReport, StoreError> {
    let mut report = ImportReport::default();

    for entry in document.templates {
        if registry.get_template(&entry.name).is_err() {
            warn!(template = %entry.name, "Skipping import of unregistered template");
            report.skipped.push(entry.name);
            continue;
        }
        if registry.resolve_layout(&entry.layout).is_err() {
            warn!(template = %entry.name, layout = %entry.layout, "Skipping import with unknown layout");
            report.skipped.push(entry.name);
            continue;
        }

        let current = store
            .get(&entry.name)
            .await?
            .unwrap_or_else(|| TemplateRecord::new(entry.name.clone()));
        let changes = TemplateChanges {
            layout: entry.layout,
            subject: entry.subject,
            body: entry.body,
            enabled: entry.enabled,
        };
        let saved = store.save(changes.apply(current)).await?;
        report.imported.push(saved.name);
    }

    info!(
        imported = report.imported.len(),
        skipped = report.skipped.len(),
        "Template import finished"
    );
    Ok(report)
}

//! JSON snapshot file store

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::transfer::ExportDocument;
use super::{MemoryStore, StoreError, TemplateRecord, TemplateStore};

/// A [`MemoryStore`] persisted to a JSON file after every write
///
/// The file uses the same document format as exports, so an export can be
/// dropped in place as a store file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open the store at `path`, loading it if the file exists
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file exists but cannot be read or
    /// parsed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<ExportDocument>(&bytes)?.templates,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), records = records.len(), "Opened template store file");

        Ok(Self {
            path,
            inner: MemoryStore::with_records(records),
            write_lock: Mutex::new(()),
        })
    }

    /// Location of the snapshot file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `templates` to the snapshot file
    ///
    /// The document is staged next to the target and renamed over it; a
    /// failed write removes the staging file and leaves the target as it was.
    async fn persist(&self, templates: Vec<TemplateRecord>) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(&ExportDocument { templates })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let staging = self.path.with_extension("json.tmp");
        let written = match tokio::fs::write(&staging, bytes).await {
            Ok(()) => tokio::fs::rename(&staging, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            warn!(path = %self.path.display(), error = %e, "Template store file not written");
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }

        debug!(path = %self.path.display(), "Template store file written");
        Ok(())
    }
}

#[async_trait]
impl TemplateStore for FileStore {
    async fn get(&self, name: &str) -> Result<Option<TemplateRecord>, StoreError> {
        self.inner.get(name).await
    }

    async fn list(&self) -> Result<Vec<TemplateRecord>, StoreError> {
        self.inner.list().await
    }

    async fn save(&self, record: TemplateRecord) -> Result<TemplateRecord, StoreError> {
        let _guard = self.write_lock.lock().await;
        let Some(saved) = self.inner.plan_save(record.clone()) else {
            return Ok(self.inner.get(&record.name).await?.unwrap_or(record));
        };
        self.persist(self.inner.snapshot_with(&saved)).await?;
        self.inner.put(saved.clone());
        Ok(saved)
    }

    async fn insert_if_missing(&self, record: TemplateRecord) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        if self.inner.contains(&record.name) {
            return Ok(false);
        }
        self.persist(self.inner.snapshot_with(&record)).await?;
        self.inner.put(record);
        Ok(true)
    }
}

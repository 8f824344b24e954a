//! Template record persistence
//!
//! Records are owned by the host application; [`TemplateStore`] is the seam
//! through which the admin handlers and the mailer read and write them.
//! Two adapters ship with the crate: [`MemoryStore`] and [`FileStore`],
//! which snapshots every save to a JSON file.

mod file;
mod memory;
mod record;
pub mod transfer;

use async_trait::async_trait;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use record::{TemplateChanges, TemplateRecord};

/// Errors raised by record stores
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a valid record document
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage for [`TemplateRecord`]s keyed by template name
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Fetch one record
    async fn get(&self, name: &str) -> Result<Option<TemplateRecord>, StoreError>;

    /// Fetch every record ordered by name
    async fn list(&self) -> Result<Vec<TemplateRecord>, StoreError>;

    /// Insert or update a record
    ///
    /// The incoming version is ignored. If the content differs from what
    /// is stored the version becomes the stored version plus one; otherwise
    /// the stored record is returned untouched.
    async fn save(&self, record: TemplateRecord) -> Result<TemplateRecord, StoreError>;

    /// Insert `record` unless one with the same name exists
    ///
    /// Returns whether the record was inserted.
    async fn insert_if_missing(&self, record: TemplateRecord) -> Result<bool, StoreError>;
}

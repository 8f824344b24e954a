//! In-memory record store

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::{StoreError, TemplateRecord, TemplateStore};

/// Records kept in a process-local map, ordered by name
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, TemplateRecord>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `records` as-is
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = TemplateRecord>) -> Self {
        Self {
            records: RwLock::new(
                records
                    .into_iter()
                    .map(|record| (record.name.clone(), record))
                    .collect(),
            ),
        }
    }

    /// Copy of every record, ordered by name
    #[must_use]
    pub fn snapshot(&self) -> Vec<TemplateRecord> {
        self.records.read().values().cloned().collect()
    }

    /// The record `save` would store, or `None` if nothing changed
    pub(super) fn plan_save(&self, record: TemplateRecord) -> Option<TemplateRecord> {
        let current = self.records.read().get(&record.name).cloned();
        match current {
            Some(existing) if existing.same_content(&record) => None,
            existing => {
                let version = existing.map_or(0, |e| e.version).saturating_add(1);
                Some(TemplateRecord { version, ..record })
            }
        }
    }

    /// Every record with `record` put in place, ordered by name
    pub(super) fn snapshot_with(&self, record: &TemplateRecord) -> Vec<TemplateRecord> {
        let mut records = self.records.read().clone();
        records.insert(record.name.clone(), record.clone());
        records.into_values().collect()
    }

    pub(super) fn contains(&self, name: &str) -> bool {
        self.records.read().contains_key(name)
    }

    pub(super) fn put(&self, record: TemplateRecord) {
        debug!(template = %record.name, version = record.version, "Template record saved");
        self.records.write().insert(record.name.clone(), record);
    }

    fn save_now(&self, record: TemplateRecord) -> TemplateRecord {
        let mut records = self.records.write();
        let existing = records.get(&record.name);
        if let Some(existing) = existing.filter(|e| e.same_content(&record)) {
            return existing.clone();
        }
        let version = existing.map_or(0, |e| e.version).saturating_add(1);
        let saved = TemplateRecord { version, ..record };
        records.insert(saved.name.clone(), saved.clone());
        drop(records);

        debug!(template = %saved.name, version, "Template record saved");
        saved
    }

    fn insert_now(&self, record: TemplateRecord) -> bool {
        let mut records = self.records.write();
        if records.contains_key(&record.name) {
            return false;
        }
        records.insert(record.name.clone(), record);
        true
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn get(&self, name: &str) -> Result<Option<TemplateRecord>, StoreError> {
        Ok(self.records.read().get(name).cloned())
    }

    async fn list(&self) -> Result<Vec<TemplateRecord>, StoreError> {
        Ok(self.snapshot())
    }

    async fn save(&self, record: TemplateRecord) -> Result<TemplateRecord, StoreError> {
        Ok(self.save_now(record))
    }

    async fn insert_if_missing(&self, record: TemplateRecord) -> Result<bool, StoreError> {
        Ok(self.insert_now(record))
    }
}

//! In-memory collaborators for tests and embedding hosts without storage.

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::audit::{
    AttachmentStore, AuditEntry, AuditId, AuditLog, AuditUpdate, ConfigStore, NewAuditEntry,
};
use crate::config::FiscalConfig;
use crate::core::{Document, StoreError};

/// Fixed set of fiscal profiles.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    configs: Vec<FiscalConfig>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, config: FiscalConfig) -> Self {
        self.configs.push(config);
        self
    }

    pub fn insert(&mut self, config: FiscalConfig) {
        self.configs.push(config);
    }
}

impl ConfigStore for MemoryConfigStore {
    /// First active profile of the company.
    fn active_config(&self, company_id: u64) -> Option<FiscalConfig> {
        self.configs
            .iter()
            .find(|c| c.company_id == company_id && c.active)
            .cloned()
    }
}

/// Audit rows kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every row.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn for_document(&self, document_id: u64) -> Vec<AuditEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.document_id == document_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditLog for MemoryAuditLog {
    fn create(&self, entry: NewAuditEntry) -> Result<AuditId, StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError("audit log lock poisoned".into()))?;
        let id = AuditId(entries.len() as u64 + 1);
        entries.push(AuditEntry::new(id, entry));
        Ok(id)
    }

    fn update(&self, id: AuditId, update: AuditUpdate) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError("audit log lock poisoned".into()))?;
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError(format!("audit entry {} not found", id.0)))?;
        entry.apply(update);
        Ok(())
    }

    fn get(&self, id: AuditId) -> Result<Option<AuditEntry>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StoreError("audit log lock poisoned".into()))?;
        Ok(entries.iter().find(|e| e.id == id).cloned())
    }
}

/// A stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub document_id: u64,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Attachments keyed by `"att-{n}"`.
#[derive(Debug, Default)]
pub struct MemoryAttachments {
    files: Mutex<BTreeMap<String, StoredFile>>,
    next: Mutex<u64>,
}

impl MemoryAttachments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, attachment_id: &str) -> Option<StoredFile> {
        self.files
            .lock()
            .ok()
            .and_then(|f| f.get(attachment_id).cloned())
    }

    pub fn len(&self) -> usize {
        self.files.lock().map(|f| f.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AttachmentStore for MemoryAttachments {
    fn store_pdf(
        &self,
        document: &Document,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, StoreError> {
        let mut next = self
            .next
            .lock()
            .map_err(|_| StoreError("attachment lock poisoned".into()))?;
        *next += 1;
        let id = format!("att-{}", *next);

        self.files
            .lock()
            .map_err(|_| StoreError("attachment lock poisoned".into()))?
            .insert(
                id.clone(),
                StoredFile {
                    document_id: document.id,
                    filename: filename.to_string(),
                    bytes: bytes.to_vec(),
                },
            );
        Ok(id)
    }

    fn remove(&self, attachment_id: &str) -> Result<(), StoreError> {
        self.files
            .lock()
            .map_err(|_| StoreError("attachment lock poisoned".into()))?
            .remove(attachment_id)
            .map(|_| ())
            .ok_or_else(|| StoreError(format!("attachment {attachment_id} not found")))
    }
}

//! Audit trail of submission attempts and the host persistence seams.
//!
//! One [`AuditEntry`] per attempt. The request snapshot is written once at
//! creation; [`AuditUpdate`] can only touch the mutable fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::FiscalConfig;
use crate::core::{Document, StoreError};

/// Audit row identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AuditId(pub u64);

/// Progress of a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Pending,
    Sent,
    Fiscalized,
    Failed,
}

/// Data for a new audit row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub document_id: u64,
    pub document_name: String,
    pub company_id: u64,
    /// Indented request body.
    pub request_data: String,
    pub created_at: DateTime<Utc>,
}

impl NewAuditEntry {
    pub fn for_document(document: &Document, request_data: String) -> Self {
        Self {
            document_id: document.id,
            document_name: document.name.clone(),
            company_id: document.company_id,
            request_data,
            created_at: Utc::now(),
        }
    }
}

/// A stored audit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditId,
    pub document_id: u64,
    pub document_name: String,
    pub company_id: u64,
    pub status: AuditStatus,
    pub request_data: String,
    pub response_data: Option<String>,
    pub error_message: Option<String>,
    pub request_id: Option<String>,
    pub fiscal_number: Option<String>,
    pub sent_date: Option<DateTime<Utc>>,
    pub fiscalized_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(id: AuditId, entry: NewAuditEntry) -> Self {
        Self {
            id,
            document_id: entry.document_id,
            document_name: entry.document_name,
            company_id: entry.company_id,
            status: AuditStatus::Pending,
            request_data: entry.request_data,
            response_data: None,
            error_message: None,
            request_id: None,
            fiscal_number: None,
            sent_date: None,
            fiscalized_date: None,
            created_at: entry.created_at,
        }
    }

    /// Apply the set fields of `update`.
    pub fn apply(&mut self, update: AuditUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if update.response_data.is_some() {
            self.response_data = update.response_data;
        }
        if update.error_message.is_some() {
            self.error_message = update.error_message;
        }
        if update.request_id.is_some() {
            self.request_id = update.request_id;
        }
        if update.fiscal_number.is_some() {
            self.fiscal_number = update.fiscal_number;
        }
        if update.sent_date.is_some() {
            self.sent_date = update.sent_date;
        }
        if update.fiscalized_date.is_some() {
            self.fiscalized_date = update.fiscalized_date;
        }
    }
}

/// Partial update of an audit row. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditUpdate {
    pub status: Option<AuditStatus>,
    pub response_data: Option<String>,
    pub error_message: Option<String>,
    pub request_id: Option<String>,
    pub fiscal_number: Option<String>,
    pub sent_date: Option<DateTime<Utc>>,
    pub fiscalized_date: Option<DateTime<Utc>>,
}

impl AuditUpdate {
    pub fn status(status: AuditStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn response(body: impl Into<String>) -> Self {
        Self {
            response_data: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn sent(at: DateTime<Utc>) -> Self {
        Self {
            sent_date: Some(at),
            ..Self::status(AuditStatus::Sent)
        }
    }

    pub fn fiscalized(fiscal_number: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            fiscal_number: Some(fiscal_number.into()),
            fiscalized_date: Some(at),
            ..Self::status(AuditStatus::Fiscalized)
        }
    }

    pub fn failed(error: impl Into<String>, request_id: Option<String>) -> Self {
        Self {
            error_message: Some(error.into()),
            request_id,
            ..Self::status(AuditStatus::Failed)
        }
    }
}

/// Where audit rows live.
pub trait AuditLog {
    fn create(&self, entry: NewAuditEntry) -> Result<AuditId, StoreError>;
    fn update(&self, id: AuditId, update: AuditUpdate) -> Result<(), StoreError>;
    fn get(&self, id: AuditId) -> Result<Option<AuditEntry>, StoreError>;
}

/// Lookup of the active fiscal profile of a company.
pub trait ConfigStore {
    fn active_config(&self, company_id: u64) -> Option<FiscalConfig>;
}

/// File storage for fiscal PDFs.
pub trait AttachmentStore {
    /// Store `bytes` for `document`; returns the attachment identifier.
    fn store_pdf(
        &self,
        document: &Document,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, StoreError>;

    fn remove(&self, attachment_id: &str) -> Result<(), StoreError>;
}

impl<T: AuditLog + ?Sized> AuditLog for &T {
    fn create(&self, entry: NewAuditEntry) -> Result<AuditId, StoreError> {
        (**self).create(entry)
    }

    fn update(&self, id: AuditId, update: AuditUpdate) -> Result<(), StoreError> {
        (**self).update(id, update)
    }

    fn get(&self, id: AuditId) -> Result<Option<AuditEntry>, StoreError> {
        (**self).get(id)
    }
}

impl<T: ConfigStore + ?Sized> ConfigStore for &T {
    fn active_config(&self, company_id: u64) -> Option<FiscalConfig> {
        (**self).active_config(company_id)
    }
}

impl<T: AttachmentStore + ?Sized> AttachmentStore for &T {
    fn store_pdf(
        &self,
        document: &Document,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, StoreError> {
        (**self).store_pdf(document, filename, bytes)
    }

    fn remove(&self, attachment_id: &str) -> Result<(), StoreError> {
        (**self).remove(attachment_id)
    }
}

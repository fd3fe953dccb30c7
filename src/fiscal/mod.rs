//! Fiscalization workflow: submission, lifecycle hooks, operator actions,
//! the retry sweep and PDF retrieval.
//!
//! [`FiscalizationService`] is generic over its collaborators so hosts can
//! plug in their own persistence ([`ConfigStore`], [`AuditLog`],
//! [`AttachmentStore`]) and transport. The `Memory*` types are complete
//! in-process implementations.

mod actions;
mod audit;
mod hooks;
mod memory;
mod pdf;
mod retry;
mod service;

pub use actions::{Notification, NotificationLevel};
pub use audit::{
    AttachmentStore, AuditEntry, AuditId, AuditLog, AuditStatus, AuditUpdate, ConfigStore,
    NewAuditEntry,
};
pub use memory::{MemoryAttachments, MemoryAuditLog, MemoryConfigStore, StoredFile};
pub use pdf::{decode_pdf, pdf_filename};
pub use retry::{MAX_AUTO_RETRIES, RetrySummary, is_retry_candidate};
pub use service::{FiscalizationService, SubmitOutcome, should_fiscalize, should_fiscalize_with};

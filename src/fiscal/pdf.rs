//! Fiscal PDF handling.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{info, warn};

use super::audit::{AttachmentStore, AuditLog, ConfigStore};
use super::service::FiscalizationService;
use crate::core::{Document, FiscalError};
use crate::transport::{Endpoint, Transport, parse_pdf_response};

/// Decode `data` as base64 PDF bytes. `None` when it is not base64 or the
/// bytes do not carry the `%PDF` signature (i.e. it is a reference token).
pub fn decode_pdf(data: &str) -> Option<Vec<u8>> {
    let bytes = STANDARD.decode(data.trim()).ok()?;
    bytes.starts_with(b"%PDF").then_some(bytes)
}

/// Attachment file name for a document's fiscal PDF.
pub fn pdf_filename(document: &Document) -> String {
    let stem: String = document
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("{stem}_fiscal.pdf")
}

impl<C, A, S, T> FiscalizationService<C, A, S, T>
where
    C: ConfigStore,
    A: AuditLog,
    S: AttachmentStore,
    T: Transport,
{
    /// Retrieve the fiscal PDF for a document holding a PDF reference and
    /// attach it. Returns the attachment identifier.
    ///
    /// A previously attached PDF is replaced and removed from the store.
    /// Failures are recorded on the document without a status change.
    pub fn fetch_pdf(&self, document: &mut Document) -> Result<String, FiscalError> {
        match self.try_fetch_pdf(document) {
            Ok(id) => {
                if let Some(previous) = document.fiscal.pdf_attachment().filter(|p| *p != id) {
                    if let Err(e) = self.attachments().remove(previous) {
                        warn!(document = %document.name, attachment = %previous, error = %e, "Failed to remove replaced fiscal PDF");
                    }
                }
                info!(document = %document.name, attachment = %id, "Fiscal PDF attached");
                document.fiscal.attach_pdf(id.clone());
                Ok(id)
            }
            Err(err) => {
                warn!(document = %document.name, error = %err, "Fiscal PDF retrieval failed");
                document.fiscal.record_error(err.to_string());
                Err(err)
            }
        }
    }

    fn try_fetch_pdf(&self, document: &Document) -> Result<String, FiscalError> {
        let config = self.config_for(document)?;
        let reference = document
            .fiscal
            .pdf_reference()
            .ok_or_else(|| FiscalError::Unexpected("No PDF reference on document".into()))?;

        let body = serde_json::json!({ "Reference": reference }).to_string();
        let response = self
            .transport()
            .post(&config, Endpoint::Pdf.path(), &body)?;
        let data = parse_pdf_response(&response)?;
        let bytes = STANDARD
            .decode(data.trim())
            .map_err(|e| FiscalError::Transport(format!("invalid PDF data: {e}")))?;

        Ok(self
            .attachments()
            .store_pdf(document, &pdf_filename(document), &bytes)?)
    }
}
